//! Seams between the batch pipeline and the services that feed it.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    error::Result,
    types::{Feed, TranscriptSegment, VideoId, VideoPage},
};

/// Upper bound on ids per [`DurationProvider::durations`] call.
pub const DURATION_BATCH: usize = 50;

pub const UNKNOWN_TITLE: &str = "Unknown Title";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    /// Captions are disabled, missing, or the video cannot be played.
    #[error("no transcript: {0}")]
    Unavailable(String),

    #[error("transcript error: {0}")]
    Other(String),
}

impl TranscriptError {
    pub fn reason(&self) -> &str {
        match self {
            TranscriptError::Unavailable(reason) | TranscriptError::Other(reason) => reason,
        }
    }
}

#[async_trait]
pub trait ChannelLister: Send + Sync {
    /// Canonical `UC…` id for a handle, username or custom name.
    async fn resolve_handle(&self, handle: &str) -> Result<String>;

    /// One page of a feed, starting at `cursor` (or the first page).
    async fn page(&self, feed: &Feed, cursor: Option<&str>) -> Result<VideoPage>;
}

#[async_trait]
pub trait DurationProvider: Send + Sync {
    /// Durations in whole seconds for at most [`DURATION_BATCH`] ids. Videos
    /// without duration data are simply absent from the map.
    async fn durations(&self, ids: &[VideoId]) -> Result<HashMap<VideoId, u64>>;
}

#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    async fn segments(
        &self,
        id: &VideoId,
    ) -> std::result::Result<Vec<TranscriptSegment>, TranscriptError>;
}

#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn title(&self, id: &VideoId) -> Result<String>;
}
