//! Caption retrieval from the public watch page.
//!
//! The watch page embeds `ytInitialPlayerResponse`, which lists the caption
//! tracks of the video. The chosen track is then downloaded in YouTube's
//! `json3` timed-text format.

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{
    provider::{TranscriptError, TranscriptProvider},
    types::{TranscriptSegment, VideoId},
};

const CONSENT_COOKIE: &str = "CONSENT=YES+cb.20210328-17-p0.en+FX+";
const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse";

pub struct CaptionClient {
    client: Client,
    lang: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    #[serde(default)]
    pub language_code: String,
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimedTextEvent {
    #[serde(default)]
    t_start_ms: f64,
    #[serde(default)]
    d_duration_ms: f64,
    segs: Option<Vec<TimedTextSeg>>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSeg {
    #[serde(default)]
    utf8: String,
}

impl CaptionClient {
    pub fn new(client: Client, lang: impl Into<String>) -> Self {
        Self {
            client,
            lang: lang.into(),
        }
    }

    async fn fetch_text(&self, url: &str, accept: &str) -> Result<String, TranscriptError> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(header::ACCEPT, accept)
            .header(header::COOKIE, CONSENT_COOKIE)
            .send()
            .await
            .map_err(|e| TranscriptError::Other(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranscriptError::Other(format!("{} returned {}", url, status)));
        }
        response
            .text()
            .await
            .map_err(|e| TranscriptError::Other(format!("failed to read response: {e}")))
    }
}

/// Parse the `ytInitialPlayerResponse = {...};` object out of a watch page.
pub fn extract_player_response(html: &str) -> Option<Value> {
    let mut rest = html;
    while let Some(pos) = rest.find(PLAYER_RESPONSE_MARKER) {
        rest = &rest[pos + PLAYER_RESPONSE_MARKER.len()..];
        let Some(after_eq) = rest.trim_start().strip_prefix('=') else {
            continue;
        };
        let json = after_eq.trim_start();
        if !json.starts_with('{') {
            continue;
        }
        let mut stream = serde_json::Deserializer::from_str(json).into_iter::<Value>();
        if let Some(Ok(value)) = stream.next() {
            return Some(value);
        }
    }
    None
}

/// Caption tracks listed in the player response, or a classified reason why
/// there are none.
pub fn caption_tracks(player: &Value) -> Result<Vec<CaptionTrack>, TranscriptError> {
    let tracks = player
        .pointer("/captions/playerCaptionsTracklistRenderer/captionTracks")
        .cloned()
        .map(serde_json::from_value::<Vec<CaptionTrack>>)
        .transpose()
        .map_err(|e| TranscriptError::Other(format!("malformed caption tracks: {e}")))?
        .unwrap_or_default();

    if !tracks.is_empty() {
        return Ok(tracks);
    }

    let status = player
        .pointer("/playabilityStatus/status")
        .and_then(Value::as_str)
        .unwrap_or("OK");
    if status != "OK" {
        let reason = player
            .pointer("/playabilityStatus/reason")
            .and_then(Value::as_str)
            .unwrap_or(status);
        return Err(TranscriptError::Unavailable(format!("Video unavailable: {reason}")));
    }
    Err(TranscriptError::Unavailable(
        "Transcripts are disabled for this video".to_string(),
    ))
}

/// Exact language, then a regional variant of it, then any English track,
/// then whatever comes first. Manual tracks win over auto-generated ones at
/// each step.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], lang: &str) -> Option<&'a CaptionTrack> {
    let lang = lang.to_lowercase();
    let code = |t: &CaptionTrack| t.language_code.to_lowercase();
    let rules: [&dyn Fn(&CaptionTrack) -> bool; 3] = [
        &|t| code(t) == lang,
        &|t| code(t).split('-').next() == Some(lang.as_str()),
        &|t| code(t).starts_with("en"),
    ];

    for rule in rules {
        let mut candidates = tracks.iter().filter(|t| rule(*t));
        let first = candidates.next();
        let manual = first
            .into_iter()
            .chain(candidates)
            .find(|t| t.kind.as_deref() != Some("asr"));
        if let Some(track) = manual.or(first) {
            return Some(track);
        }
    }
    tracks.first()
}

/// `base_url` with `fmt=json3`, replacing any format already requested.
pub fn json3_url(base_url: &str) -> Result<String, TranscriptError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| TranscriptError::Other(format!("bad caption url: {e}")))?;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "fmt")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("fmt", "json3");
    Ok(url.into())
}

/// Segments of a `json3` payload. Events without text are skipped.
pub fn parse_json3(body: &str) -> Result<Vec<TranscriptSegment>, TranscriptError> {
    let timed: TimedText = serde_json::from_str(body)
        .map_err(|e| TranscriptError::Other(format!("malformed transcript: {e}")))?;

    Ok(timed
        .events
        .into_iter()
        .filter_map(|event| {
            let text = event
                .segs?
                .into_iter()
                .map(|s| s.utf8)
                .collect::<String>()
                .replace('\n', " ");
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment::new(
                text,
                event.t_start_ms.max(0.0) / 1000.0,
                event.d_duration_ms.max(0.0) / 1000.0,
            ))
        })
        .collect())
}

#[async_trait]
impl TranscriptProvider for CaptionClient {
    async fn segments(&self, id: &VideoId) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        let html = self
            .fetch_text(&id.watch_url(), "text/html,application/xhtml+xml")
            .await?;
        let player = extract_player_response(&html).ok_or_else(|| {
            TranscriptError::Other("could not find player response in page".to_string())
        })?;

        let tracks = caption_tracks(&player)?;
        let track = select_track(&tracks, &self.lang)
            .ok_or_else(|| TranscriptError::Unavailable("no caption tracks".to_string()))?;
        debug!(
            "Using {} caption track ({}) for {}",
            track.language_code,
            track.kind.as_deref().unwrap_or("manual"),
            id
        );

        let body = self
            .fetch_text(&json3_url(&track.base_url)?, "application/json, */*")
            .await?;
        if body.trim().is_empty() {
            return Err(TranscriptError::Other("empty transcript response".to_string()));
        }
        parse_json3(&body)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn track(code: &str, kind: Option<&str>) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://www.youtube.com/api/timedtext?lang={code}"),
            language_code: code.to_string(),
            kind: kind.map(str::to_string),
        }
    }

    #[test]
    fn finds_player_response_in_page() {
        let html = r#"<script>var ytInitialPlayerResponse = {"captions": {"a": "};"}, "x": 1};var meta = {};</script>"#;
        let player = extract_player_response(html).unwrap();
        assert_eq!(player["x"], 1);
        assert_eq!(player["captions"]["a"], "};");
    }

    #[test]
    fn missing_player_response() {
        assert!(extract_player_response("<html>nothing</html>").is_none());
        assert!(extract_player_response("ytInitialPlayerResponse.foo = 1").is_none());
    }

    #[test]
    fn classifies_missing_tracks() {
        let disabled = json!({"playabilityStatus": {"status": "OK"}});
        assert_eq!(
            caption_tracks(&disabled).unwrap_err(),
            TranscriptError::Unavailable("Transcripts are disabled for this video".into())
        );

        let private = json!({"playabilityStatus": {"status": "LOGIN_REQUIRED", "reason": "Private video"}});
        assert_eq!(
            caption_tracks(&private).unwrap_err(),
            TranscriptError::Unavailable("Video unavailable: Private video".into())
        );
    }

    #[test]
    fn reads_listed_tracks() {
        let player = json!({"captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [
            {"baseUrl": "https://www.youtube.com/api/timedtext?v=x", "languageCode": "en", "kind": "asr"}
        ]}}});
        let tracks = caption_tracks(&player).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].kind.as_deref(), Some("asr"));
    }

    #[test]
    fn track_selection_order() {
        let tracks = vec![track("de", None), track("en-GB", Some("asr")), track("en-GB", None)];
        assert_eq!(select_track(&tracks, "de").unwrap().language_code, "de");

        let chosen = select_track(&tracks, "en").unwrap();
        assert_eq!(chosen.language_code, "en-GB");
        assert_eq!(chosen.kind, None);

        assert_eq!(select_track(&tracks, "fr").unwrap().language_code, "en-GB");
        assert_eq!(select_track(&[track("ja", None)], "fr").unwrap().language_code, "ja");
        assert!(select_track(&[], "en").is_none());
    }

    #[test]
    fn json3_url_replaces_format() {
        let url =
            json3_url("https://www.youtube.com/api/timedtext?v=abc&fmt=srv3&lang=en").unwrap();
        assert_eq!(url, "https://www.youtube.com/api/timedtext?v=abc&lang=en&fmt=json3");
    }

    #[test]
    fn parses_json3_events() {
        let body = r#"{"events": [
            {"tStartMs": 0, "dDurationMs": 1500},
            {"tStartMs": 10000, "dDurationMs": 2500, "segs": [{"utf8": "Hello"}, {"utf8": " world"}]},
            {"tStartMs": 12000, "segs": [{"utf8": "\n"}]},
            {"tStartMs": 13500, "dDurationMs": 1000, "segs": [{"utf8": "line\nbreak"}]}
        ]}"#;
        let segments = parse_json3(body).unwrap();
        assert_eq!(
            segments,
            vec![
                TranscriptSegment::new("Hello world", 10.0, 2.5),
                TranscriptSegment::new("line break", 13.5, 1.0),
            ]
        );
    }
}
