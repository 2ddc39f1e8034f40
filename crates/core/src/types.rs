use std::fmt;

use serde::{Deserialize, Serialize};

pub const WATCH_URL: &str = "https://www.youtube.com/watch";

/// Canonical 11-character YouTube video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub const LEN: usize = 11;

    /// Accepts only strings that are exactly a well-formed id.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = raw.len() == Self::LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn watch_url(&self) -> String {
        format!("{}?v={}", WATCH_URL, self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One time-coded unit of spoken text, in provider order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TranscriptSegment {
    #[serde(default)]
    pub text: String,
    pub start: f64,
    #[serde(default)]
    pub duration: f64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub video: VideoId,
    pub link: String,
    pub timestamp: String,
    pub context: String,
}

/// All matches found in one video, with its display title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoMatches {
    pub video: VideoId,
    pub title: String,
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Popular,
}

impl SortOrder {
    /// Value of the search `order` parameter. `Oldest` has no server-side
    /// order and is produced by reversing the date-ordered listing.
    pub fn api_order(&self) -> &'static str {
        match self {
            SortOrder::Popular => "viewCount",
            SortOrder::Newest | SortOrder::Oldest => "date",
        }
    }
}

/// A paginated source of video ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    Channel { id: String, order: SortOrder },
    Playlist { id: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoPage {
    pub videos: Vec<VideoId>,
    pub next_cursor: Option<String>,
}
