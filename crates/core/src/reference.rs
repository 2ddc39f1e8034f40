//! Turning user-supplied video, channel and playlist references into ids.

use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;
use url::Url;

use crate::{
    error::{Result, YttsError},
    types::VideoId,
};

/// `v=<id>` or `/<id>`, followed by `&` or the end of the input.
static VIDEO_ID_HEURISTIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})(?:&|$)").expect("video id pattern is valid")
});

static PLAYLIST_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[?&])list=([0-9A-Za-z_-]+)").expect("playlist id pattern is valid")
});

fn is_youtube_host(host: &str) -> bool {
    let h = host.to_ascii_lowercase();
    h == "youtube.com"
        || h == "youtu.be"
        || h == "youtube-nocookie.com"
        || h.ends_with(".youtube.com")
        || h.ends_with(".youtube-nocookie.com")
}

fn video_id_from_url(url: &Url) -> Option<VideoId> {
    let host = url.host_str()?;
    if !is_youtube_host(host) {
        return None;
    }

    if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
        return VideoId::parse(v.trim());
    }

    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    let first = segments.next()?;
    if host.eq_ignore_ascii_case("youtu.be") {
        return VideoId::parse(first);
    }
    match first {
        "embed" | "shorts" | "v" | "live" | "e" => VideoId::parse(segments.next()?),
        _ => None,
    }
}

/// Extract the canonical id from a bare id, watch, short, embed or shorts URL.
///
/// Absolute YouTube URLs are read structurally; everything else falls back
/// to the `v=`/`/` heuristic. `None` is not an error, callers decide whether
/// to warn.
pub fn extract_video_id(raw: &str) -> Option<VideoId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(id) = VideoId::parse(raw) {
        return Some(id);
    }
    if let Ok(url) = Url::parse(raw) {
        if let Some(id) = video_id_from_url(&url) {
            return Some(id);
        }
    }
    VIDEO_ID_HEURISTIC
        .captures(raw)
        .and_then(|caps| VideoId::parse(&caps[1]))
}

/// Drop later duplicates, keeping first-seen order.
pub fn dedupe(ids: impl IntoIterator<Item = VideoId>) -> Vec<VideoId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelInput {
    /// A canonical `UC…` channel id.
    Id(String),
    /// A handle, legacy username or custom name that needs an API lookup.
    Handle(String),
}

/// Classify a channel id, `@handle` or channel URL.
pub fn parse_channel_input(raw: &str) -> ChannelInput {
    let raw = raw.trim();
    if let Some(handle) = raw.strip_prefix('@') {
        return ChannelInput::Handle(handle.to_string());
    }

    if raw.starts_with("http") {
        if let Ok(url) = Url::parse(raw) {
            let parts: Vec<&str> = url
                .path_segments()
                .map(|s| s.filter(|p| !p.is_empty()).collect())
                .unwrap_or_default();
            match parts.as_slice() {
                [first, ..] if first.starts_with('@') => {
                    return ChannelInput::Handle(first[1..].to_string());
                }
                ["channel", id, ..] => return ChannelInput::Id(id.to_string()),
                ["c" | "user", name, ..] => return ChannelInput::Handle(name.to_string()),
                [.., last] => return ChannelInput::Handle(last.to_string()),
                [] => {}
            }
        }
    }

    ChannelInput::Id(raw.to_string())
}

/// Playlist id from a `list=` URL parameter, or the input itself when it
/// already looks like a bare id.
pub fn extract_playlist_id(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if let Some(caps) = PLAYLIST_ID.captures(raw) {
        return Ok(caps[1].to_string());
    }
    let bare = !raw.is_empty()
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if bare {
        Ok(raw.to_string())
    } else {
        Err(YttsError::PlaylistNotFound {
            input: raw.to_string(),
        })
    }
}

/// Human-friendly video counts: `1.3k`, `2m`, `1,500`, `40`.
pub fn parse_max_videos(raw: &str) -> Result<usize> {
    let invalid = || YttsError::InvalidMaximum {
        input: raw.to_string(),
    };
    let v = raw.trim().to_lowercase().replace(',', "");

    let count = if let Some(n) = v.strip_suffix('k') {
        scaled(n, 1_000.0)
    } else if let Some(n) = v.strip_suffix('m') {
        scaled(n, 1_000_000.0)
    } else {
        v.parse::<usize>().ok()
    };

    // Zero would list nothing at all
    count.filter(|&n| n > 0).ok_or_else(invalid)
}

fn scaled(number: &str, multiplier: f64) -> Option<usize> {
    let value: f64 = number.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> VideoId {
        VideoId::parse(s).unwrap()
    }

    #[test]
    fn extracts_from_common_url_shapes() {
        let expected = Some(id("dQw4w9WgXcQ"));
        for raw in [
            "dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120s",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abcdef",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "  https://youtu.be/dQw4w9WgXcQ  ",
        ] {
            assert_eq!(extract_video_id(raw), expected, "{raw}");
        }
    }

    #[test]
    fn heuristic_handles_non_urls() {
        assert_eq!(
            extract_video_id("youtube.com/watch?v=dQw4w9WgXcQ"),
            Some(id("dQw4w9WgXcQ"))
        );
        assert_eq!(
            extract_video_id("some/path/AAAAAAAAAAA"),
            Some(id("AAAAAAAAAAA"))
        );
        assert_eq!(
            extract_video_id("v=abc_def-123&x=1"),
            Some(id("abc_def-123"))
        );
    }

    #[test]
    fn rejects_strings_without_an_id() {
        for raw in [
            "",
            "not-a-valid-id",
            "https://www.youtube.com/",
            "https://www.youtube.com/watch?v=short",
            "https://example.com/page",
            "v=dQw4w9WgXcQextra",
        ] {
            assert_eq!(extract_video_id(raw), None, "{raw}");
        }
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let (a, b, c) = (id("AAAAAAAAAAA"), id("BBBBBBBBBBB"), id("CCCCCCCCCCC"));
        let out = dedupe(vec![a.clone(), b.clone(), a.clone(), c.clone(), b.clone()]);
        assert_eq!(out, vec![a, b, c]);
    }

    #[test]
    fn classifies_channel_inputs() {
        assert_eq!(
            parse_channel_input("@veritasium"),
            ChannelInput::Handle("veritasium".into())
        );
        assert_eq!(
            parse_channel_input("https://www.youtube.com/@veritasium/videos"),
            ChannelInput::Handle("veritasium".into())
        );
        assert_eq!(
            parse_channel_input("https://www.youtube.com/channel/UCHnyfMqiRRG1u-2MsSQLbXA"),
            ChannelInput::Id("UCHnyfMqiRRG1u-2MsSQLbXA".into())
        );
        assert_eq!(
            parse_channel_input("https://www.youtube.com/user/1veritasium"),
            ChannelInput::Handle("1veritasium".into())
        );
        assert_eq!(
            parse_channel_input("UCHnyfMqiRRG1u-2MsSQLbXA"),
            ChannelInput::Id("UCHnyfMqiRRG1u-2MsSQLbXA".into())
        );
    }

    #[test]
    fn extracts_playlist_ids() {
        assert_eq!(
            extract_playlist_id("https://www.youtube.com/playlist?list=PLabc_123").unwrap(),
            "PLabc_123"
        );
        assert_eq!(
            extract_playlist_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PLxyz").unwrap(),
            "PLxyz"
        );
        assert_eq!(extract_playlist_id("PLxyz").unwrap(), "PLxyz");
        assert!(extract_playlist_id("https://example.com/nothing here").is_err());
    }

    #[test]
    fn parses_human_video_counts() {
        assert_eq!(parse_max_videos("40").unwrap(), 40);
        assert_eq!(parse_max_videos("1.3k").unwrap(), 1300);
        assert_eq!(parse_max_videos("2M").unwrap(), 2_000_000);
        assert_eq!(parse_max_videos("1,500").unwrap(), 1500);
        assert!(parse_max_videos("lots").is_err());
        assert!(parse_max_videos("k").is_err());
    }

    #[test]
    fn zero_video_count_is_rejected() {
        for raw in ["0", "0k", "0.0001k", "0,000"] {
            assert!(matches!(
                parse_max_videos(raw),
                Err(YttsError::InvalidMaximum { .. })
            ));
        }
    }
}
