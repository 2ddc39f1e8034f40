use std::collections::BTreeSet;

use serde::Serialize;

use crate::{
    provider::TranscriptError,
    search::KeywordSet,
    types::{VideoId, VideoMatches},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Captions disabled or not published for the video.
    NoTranscript,
    /// Anything else the transcript provider failed with.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoError {
    pub video: VideoId,
    pub kind: FailureKind,
    pub message: String,
}

impl VideoError {
    pub fn from_transcript(video: VideoId, err: &TranscriptError) -> Self {
        let (kind, label) = match err {
            TranscriptError::Unavailable(_) => (FailureKind::NoTranscript, "no transcript"),
            TranscriptError::Other(_) => (FailureKind::Other, "error"),
        };
        let message = format!("[{}] {}: {}", video, label, err.reason());
        Self {
            video,
            kind,
            message,
        }
    }
}

/// Keywords seen and failures recorded over a whole batch.
///
/// Only observes: nothing here decides which videos or matches are reported.
#[derive(Debug, Default)]
pub struct Coverage {
    found: BTreeSet<String>,
    errors: Vec<VideoError>,
}

impl Coverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_found(&mut self, keyword: &str) {
        self.found.insert(keyword.to_lowercase());
    }

    pub fn record_error(&mut self, error: VideoError) {
        self.errors.push(error);
    }

    pub fn is_found(&self, keyword: &str) -> bool {
        self.found.contains(&keyword.to_lowercase())
    }

    pub fn found(&self) -> &BTreeSet<String> {
        &self.found
    }

    pub fn errors(&self) -> &[VideoError] {
        &self.errors
    }

    /// Keywords never found, in their original order and casing.
    pub fn missing(&self, keywords: &KeywordSet) -> Vec<String> {
        keywords
            .iter()
            .filter(|kw| !self.is_found(kw))
            .map(str::to_string)
            .collect()
    }

    pub fn finish(
        self,
        keywords: &KeywordSet,
        videos: Vec<VideoMatches>,
        scanned: usize,
    ) -> BatchResult {
        let missing = self.missing(keywords);
        BatchResult {
            videos,
            scanned,
            found: self.found,
            missing,
            errors: self.errors,
        }
    }
}

/// Final, read-only outcome of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Videos with at least one match, in processing order.
    pub videos: Vec<VideoMatches>,
    pub scanned: usize,
    pub found: BTreeSet<String>,
    pub missing: Vec<String>,
    pub errors: Vec<VideoError>,
}

impl BatchResult {
    pub fn total_matches(&self) -> usize {
        self.videos.iter().map(|v| v.matches.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_is_case_insensitive_and_missing_keeps_casing() {
        let keywords = KeywordSet::parse("Rust, Tokio, SERDE");
        let mut coverage = Coverage::new();
        coverage.record_found("rust");
        coverage.record_found("RUST");

        assert!(coverage.is_found("Rust"));
        assert_eq!(coverage.found().len(), 1);
        assert_eq!(coverage.missing(&keywords), vec!["Tokio", "SERDE"]);
    }

    #[test]
    fn classifies_transcript_failures() {
        let video = VideoId::parse("AAAAAAAAAAA").unwrap();
        let disabled = VideoError::from_transcript(
            video.clone(),
            &TranscriptError::Unavailable("Transcripts are disabled".into()),
        );
        assert_eq!(disabled.kind, FailureKind::NoTranscript);
        assert_eq!(
            disabled.message,
            "[AAAAAAAAAAA] no transcript: Transcripts are disabled"
        );

        let other = VideoError::from_transcript(video, &TranscriptError::Other("timeout".into()));
        assert_eq!(other.kind, FailureKind::Other);
        assert!(other.message.starts_with("[AAAAAAAAAAA] error:"));
    }
}
