//! Candidate selection and the sequential per-video search loop.

use std::{collections::HashMap, path::PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};

use crate::{
    coverage::{BatchResult, Coverage, VideoError},
    error::Result,
    filter::filter_by_length,
    format::Highlight,
    length::LengthExpr,
    provider::{
        ChannelLister, DURATION_BATCH, DurationProvider, MetadataProvider, TranscriptProvider,
        UNKNOWN_TITLE,
    },
    reference::{ChannelInput, dedupe, extract_playlist_id, extract_video_id, parse_channel_input},
    search::SearchEngine,
    types::{Feed, SortOrder, VideoId, VideoMatches},
};

/// Where the videos of a batch come from.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub channel: Option<String>,
    pub sort: SortOrder,
    pub playlist: Option<String>,
    pub max_videos: Option<usize>,
    pub video: Option<String>,
    pub url_file: Option<PathBuf>,
}

/// An input that could not be turned into videos; the batch goes on without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub input: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct Candidates {
    pub videos: Vec<VideoId>,
    pub rejected: Vec<Rejected>,
}

/// Lazy page-by-page walk over a feed.
///
/// Pages are fetched only on demand, so callers can stop as soon as they have
/// enough ids. [`FeedPages::cursor`] is where a new walk would resume.
pub struct FeedPages<'a> {
    lister: &'a dyn ChannelLister,
    feed: Feed,
    cursor: Option<String>,
    exhausted: bool,
}

impl<'a> FeedPages<'a> {
    pub fn new(lister: &'a dyn ChannelLister, feed: Feed) -> Self {
        Self {
            lister,
            feed,
            cursor: None,
            exhausted: false,
        }
    }

    pub fn resume(lister: &'a dyn ChannelLister, feed: Feed, cursor: String) -> Self {
        Self {
            lister,
            feed,
            cursor: Some(cursor),
            exhausted: false,
        }
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// `Ok(None)` once the last page has been returned.
    pub async fn next_page(&mut self) -> Result<Option<Vec<VideoId>>> {
        if self.exhausted {
            return Ok(None);
        }
        let page = self.lister.page(&self.feed, self.cursor.as_deref()).await?;
        debug!(
            "Fetched {} ids from {:?} (next cursor: {:?})",
            page.videos.len(),
            self.feed,
            page.next_cursor
        );

        self.exhausted = page.next_cursor.is_none();
        self.cursor = page.next_cursor;
        Ok(Some(page.videos))
    }
}

/// All ids of a feed, capped at `max`. A channel listed `Oldest` is the
/// date-ordered listing reversed after capping.
pub async fn list_feed(
    lister: &dyn ChannelLister,
    feed: Feed,
    max: Option<usize>,
) -> Result<Vec<VideoId>> {
    let reverse = matches!(
        feed,
        Feed::Channel {
            order: SortOrder::Oldest,
            ..
        }
    );
    let mut pages = FeedPages::new(lister, feed);
    let mut ids = Vec::new();

    while let Some(batch) = pages.next_page().await? {
        ids.extend(batch);
        if let Some(max) = max {
            if ids.len() >= max {
                ids.truncate(max);
                break;
            }
        }
    }

    if reverse {
        ids.reverse();
    }
    Ok(ids)
}

pub async fn resolve_channel(lister: &dyn ChannelLister, raw: &str) -> Result<String> {
    match parse_channel_input(raw) {
        ChannelInput::Id(id) => Ok(id),
        ChannelInput::Handle(handle) => lister.resolve_handle(&handle).await,
    }
}

/// Gather ids from every source, in the order channel, playlist, video,
/// file, then drop later duplicates.
pub async fn collect_candidates(lister: &dyn ChannelLister, sources: &Sources) -> Candidates {
    let mut ids = Vec::new();
    let mut rejected = Vec::new();

    if let Some(raw) = &sources.channel {
        let listed = async {
            let channel_id = resolve_channel(lister, raw).await?;
            info!("Listing channel {} ({:?})", channel_id, sources.sort);
            let feed = Feed::Channel {
                id: channel_id,
                order: sources.sort,
            };
            list_feed(lister, feed, sources.max_videos).await
        };
        match listed.await {
            Ok(found) => ids.extend(found),
            Err(e) => {
                warn!("Channel fetch error for {}: {}", raw, e);
                rejected.push(Rejected {
                    input: raw.clone(),
                    reason: format!("Channel fetch error: {e}"),
                });
            }
        }
    }

    if let Some(raw) = &sources.playlist {
        let listed = async {
            let id = extract_playlist_id(raw)?;
            list_feed(lister, Feed::Playlist { id }, sources.max_videos).await
        };
        match listed.await {
            Ok(found) => ids.extend(found),
            Err(e) => {
                warn!("Playlist fetch error for {}: {}", raw, e);
                rejected.push(Rejected {
                    input: raw.clone(),
                    reason: format!("Playlist fetch error: {e}"),
                });
            }
        }
    }

    if let Some(raw) = &sources.video {
        match extract_video_id(raw) {
            Some(id) => ids.push(id),
            None => rejected.push(Rejected {
                input: raw.clone(),
                reason: "Bad video URL".to_string(),
            }),
        }
    }

    if let Some(path) = &sources.url_file {
        match fs::read_to_string(path).await {
            Ok(content) => {
                for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
                    match extract_video_id(line) {
                        Some(id) => ids.push(id),
                        None => rejected.push(Rejected {
                            input: line.to_string(),
                            reason: format!("Bad URL in {}", path.display()),
                        }),
                    }
                }
            }
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                rejected.push(Rejected {
                    input: path.display().to_string(),
                    reason: "File not found".to_string(),
                });
            }
        }
    }

    Candidates {
        videos: dedupe(ids),
        rejected,
    }
}

/// Durations for `videos`, requested in batches of [`DURATION_BATCH`].
///
/// A failed batch leaves its videos out of the map; gaps are not errors.
pub async fn fetch_durations(
    provider: &dyn DurationProvider,
    videos: &[VideoId],
) -> HashMap<VideoId, u64> {
    let mut durations = HashMap::new();
    for batch in videos.chunks(DURATION_BATCH) {
        match provider.durations(batch).await {
            Ok(found) => durations.extend(found),
            Err(e) => warn!("Duration lookup failed for {} videos: {}", batch.len(), e),
        }
    }
    durations
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Ready(Vec<VideoId>),
    /// No video was supplied by any source.
    NoVideos,
    /// Videos were supplied but none passed the length filters.
    NoneMatchLength,
}

/// Apply the length filters, looking up durations only when there are any.
pub async fn select_by_length(
    provider: &dyn DurationProvider,
    videos: Vec<VideoId>,
    exprs: &[LengthExpr],
) -> Selection {
    if videos.is_empty() {
        return Selection::NoVideos;
    }
    if exprs.is_empty() {
        return Selection::Ready(videos);
    }

    let durations = fetch_durations(provider, &videos).await;
    let kept = filter_by_length(&videos, &durations, exprs);
    info!("{} of {} videos pass the length filters", kept.len(), videos.len());

    if kept.is_empty() {
        Selection::NoneMatchLength
    } else {
        Selection::Ready(kept)
    }
}

/// Progress callbacks from [`BatchRunner::run`].
pub trait BatchObserver {
    fn video_started(&mut self, _index: usize, _total: usize, _video: &VideoId) {}

    /// `matches` is set only when the video had at least one match.
    fn video_finished(&mut self, _index: usize, _total: usize, _matches: Option<&VideoMatches>) {}
}

/// Observer that ignores everything.
pub struct Silent;

impl BatchObserver for Silent {}

pub struct BatchRunner<'a, H: Highlight + ?Sized> {
    transcripts: &'a dyn TranscriptProvider,
    metadata: &'a dyn MetadataProvider,
    engine: SearchEngine<'a, H>,
}

impl<'a, H: Highlight + ?Sized> BatchRunner<'a, H> {
    pub fn new(
        transcripts: &'a dyn TranscriptProvider,
        metadata: &'a dyn MetadataProvider,
        engine: SearchEngine<'a, H>,
    ) -> Self {
        Self {
            transcripts,
            metadata,
            engine,
        }
    }

    async fn title_or_placeholder(&self, id: &VideoId) -> String {
        match self.metadata.title(id).await {
            Ok(title) if !title.trim().is_empty() => title,
            Ok(_) => UNKNOWN_TITLE.to_string(),
            Err(e) => {
                debug!("Title lookup failed for {}: {}", id, e);
                UNKNOWN_TITLE.to_string()
            }
        }
    }

    /// Process `videos` one at a time, in order. Transcript failures are
    /// recorded and the loop moves on.
    pub async fn run<O: BatchObserver + ?Sized>(
        &self,
        videos: &[VideoId],
        observer: &mut O,
    ) -> BatchResult {
        let total = videos.len();
        let mut coverage = Coverage::new();
        let mut results = Vec::new();

        for (idx, id) in videos.iter().enumerate() {
            let index = idx + 1;
            observer.video_started(index, total, id);

            let segments = match self.transcripts.segments(id).await {
                Ok(segments) => segments,
                Err(e) => {
                    debug!("Transcript unavailable for {}: {}", id, e);
                    coverage.record_error(VideoError::from_transcript(id.clone(), &e));
                    observer.video_finished(index, total, None);
                    continue;
                }
            };

            let matches = self.engine.search(id, &segments, &mut coverage);
            if matches.is_empty() {
                observer.video_finished(index, total, None);
                continue;
            }

            let found = VideoMatches {
                video: id.clone(),
                title: self.title_or_placeholder(id).await,
                matches,
            };
            observer.video_finished(index, total, Some(&found));
            results.push(found);
        }

        coverage.finish(self.engine.keywords(), results, total)
    }
}
