use crate::{
    coverage::Coverage,
    format::{Highlight, format_timestamp, highlight_keywords, jump_link},
    types::{Match, TranscriptSegment, VideoId},
};

/// Segments of context kept on each side of a matching segment.
pub const DEFAULT_CONTEXT: usize = 1;

/// Ordered keywords, compared case-insensitively but displayed as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeywordSet {
    keywords: Vec<String>,
    lowered: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for kw in keywords {
            let kw = kw.into();
            let kw = kw.trim();
            if kw.is_empty() || set.keywords.iter().any(|k| k == kw) {
                continue;
            }
            set.lowered.push(kw.to_lowercase());
            set.keywords.push(kw.to_string());
        }
        set
    }

    /// Comma separated list. A `"` that opens a keyword groups a phrase up to
    /// the next `"`, commas included; any other quote character is literal.
    pub fn parse(input: &str) -> Self {
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut quoted = false;

        for ch in input.chars() {
            match ch {
                '"' if quoted => quoted = false,
                '"' if current.trim().is_empty() => {
                    current.clear();
                    quoted = true;
                }
                ',' if !quoted => parts.push(std::mem::take(&mut current)),
                c => current.push(c),
            }
        }
        parts.push(current);

        Self::new(parts)
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keywords
    }

    fn lowered(&self) -> impl Iterator<Item = &str> {
        self.lowered.iter().map(String::as_str)
    }
}

/// Scans one video's transcript at a time.
///
/// The engine keeps no state between calls; keyword coverage goes into the
/// caller's [`Coverage`].
pub struct SearchEngine<'a, H: Highlight + ?Sized> {
    keywords: &'a KeywordSet,
    highlighter: &'a H,
    context: usize,
}

impl<'a, H: Highlight + ?Sized> SearchEngine<'a, H> {
    pub fn new(keywords: &'a KeywordSet, highlighter: &'a H) -> Self {
        Self {
            keywords,
            highlighter,
            context: DEFAULT_CONTEXT,
        }
    }

    pub fn with_context(mut self, context: usize) -> Self {
        self.context = context;
        self
    }

    pub fn keywords(&self) -> &'a KeywordSet {
        self.keywords
    }

    /// One [`Match`] per segment containing any keyword, in segment order.
    pub fn search(
        &self,
        video: &VideoId,
        segments: &[TranscriptSegment],
        coverage: &mut Coverage,
    ) -> Vec<Match> {
        let mut matches = Vec::new();

        for (i, segment) in segments.iter().enumerate() {
            let low_text = segment.text.to_lowercase();

            let mut hit = false;
            for kw in self.keywords.lowered() {
                if low_text.contains(kw) {
                    coverage.record_found(kw);
                    hit = true;
                }
            }
            if !hit {
                continue;
            }

            let from = i.saturating_sub(self.context);
            let to = i
                .saturating_add(self.context)
                .saturating_add(1)
                .min(segments.len());
            let context = segments[from..to]
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");

            matches.push(Match {
                video: video.clone(),
                link: jump_link(video, segment.start),
                timestamp: format_timestamp(segment.start),
                context: highlight_keywords(
                    &context,
                    self.keywords.as_slice(),
                    self.highlighter,
                ),
            });
        }

        matches
    }
}
