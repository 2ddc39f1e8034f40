//! ytts Core Library
//!
//! Collects YouTube videos from channels, playlists and URL lists, filters
//! them by length, and searches their transcripts for keywords.

pub mod config;
pub mod coverage;
pub mod error;
pub mod filter;
pub mod format;
pub mod length;
pub mod pipeline;
pub mod provider;
pub mod reference;
pub mod search;
pub mod types;
pub mod youtube;

// Re-export commonly used items at crate root
pub use config::Config;
pub use coverage::{BatchResult, Coverage, FailureKind, VideoError};
pub use error::{Result, YttsError};
pub use filter::filter_by_length;
pub use format::{Highlight, PlainText, format_timestamp, highlight_keywords, jump_link};
pub use length::{Comparator, LengthExpr, LengthParseError, parse_length_filters};
pub use pipeline::{
    BatchObserver, BatchRunner, Candidates, FeedPages, Rejected, Selection, Silent, Sources,
    collect_candidates, list_feed, select_by_length,
};
pub use provider::{
    ChannelLister, DurationProvider, MetadataProvider, TranscriptError, TranscriptProvider,
};
pub use reference::{dedupe, extract_video_id, parse_max_videos};
pub use search::{KeywordSet, SearchEngine};
pub use types::{Feed, Match, SortOrder, TranscriptSegment, VideoId, VideoMatches, VideoPage};
pub use youtube::{CaptionClient, DataApi};
