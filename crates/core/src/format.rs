use regex::RegexBuilder;

use crate::types::VideoId;

/// Format seconds as MM:SS timestamp. Minutes are not wrapped into hours.
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let mins = (seconds / 60.0) as u64;
    let secs = (seconds % 60.0) as u64;
    format!("{:02}:{:02}", mins, secs)
}

/// Watch URL that starts playback at `start`, truncated to whole seconds.
pub fn jump_link(video: &VideoId, start: f64) -> String {
    format!("{}&t={}s", video.watch_url(), start.max(0.0).floor() as u64)
}

/// Visual markers for highlighted keywords, one per palette slot.
pub trait Highlight {
    fn palette_size(&self) -> usize;

    fn mark(&self, slot: usize, text: &str) -> String;
}

/// Leaves text as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl Highlight for PlainText {
    fn palette_size(&self) -> usize {
        1
    }

    fn mark(&self, _slot: usize, text: &str) -> String {
        text.to_string()
    }
}

/// Wrap every case-insensitive occurrence of each keyword, keyword by keyword.
///
/// Keyword `i` uses slot `i % palette_size`. Each pass runs over the output
/// of the previous one, so markers of later keywords may land inside or
/// around markers of earlier ones when keywords overlap.
pub fn highlight_keywords<H: Highlight + ?Sized>(
    text: &str,
    keywords: &[String],
    highlighter: &H,
) -> String {
    let palette = highlighter.palette_size().max(1);
    let mut out = text.to_string();

    for (idx, keyword) in keywords.iter().enumerate() {
        if keyword.is_empty() {
            continue;
        }
        let Ok(pattern) = RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()
        else {
            continue;
        };
        let slot = idx % palette;
        let replaced = pattern.replace_all(&out, |caps: &regex::Captures| {
            highlighter.mark(slot, &caps[0])
        });
        out = replaced.into_owned();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tags;

    impl Highlight for Tags {
        fn palette_size(&self) -> usize {
            2
        }

        fn mark(&self, slot: usize, text: &str) -> String {
            format!("<{slot}>{text}</{slot}>")
        }
    }

    fn kws(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn timestamps_are_zero_padded_minutes_and_seconds() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(10.0), "00:10");
        assert_eq!(format_timestamp(65.9), "01:05");
        assert_eq!(format_timestamp(3725.0), "62:05");
    }

    #[test]
    fn jump_link_floors_start() {
        let id = VideoId::parse("dQw4w9WgXcQ").unwrap();
        assert_eq!(
            jump_link(&id, 10.99),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10s"
        );
    }

    #[test]
    fn highlights_case_insensitively_keeping_original_text() {
        let out = highlight_keywords("Hello world, HELLO again", &kws(&["hello"]), &Tags);
        assert_eq!(out, "<0>Hello</0> world, <0>HELLO</0> again");
    }

    #[test]
    fn palette_slots_cycle() {
        let out = highlight_keywords("a b c", &kws(&["a", "b", "c"]), &Tags);
        assert_eq!(out, "<0>a</0> <1>b</1> <0>c</0>");
    }

    #[test]
    fn later_keywords_apply_over_earlier_markers() {
        let out = highlight_keywords("rust", &kws(&["rust", "us"]), &Tags);
        assert_eq!(out, "<0>r<1>us</1>t</0>");
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let out = highlight_keywords("c++ and c", &kws(&["c++"]), &Tags);
        assert_eq!(out, "<0>c++</0> and c");
    }

    #[test]
    fn plain_text_is_identity() {
        let out = highlight_keywords("Hello", &kws(&["hello"]), &PlainText);
        assert_eq!(out, "Hello");
    }
}
