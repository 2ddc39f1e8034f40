//! YouTube Data API v3: channel resolution, listings, durations and titles.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;
use url::Url;

use crate::{
    config::Config,
    error::{Result, YttsError},
    provider::{ChannelLister, DURATION_BATCH, DurationProvider, MetadataProvider},
    types::{Feed, VideoId, VideoPage},
    youtube::iso_duration::parse_iso_duration,
};

const PAGE_SIZE: &str = "50";

pub struct DataApi {
    client: Client,
    base: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
    channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    content_details: Option<PlaylistItemDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemDetails {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: Option<VideoSnippet>,
    content_details: Option<VideoContentDetails>,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    title: String,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl DataApi {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base: config.api_base.clone(),
            api_key: config.api_key.clone(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = Url::parse_with_params(
            &format!("{}/{}", self.base, endpoint),
            params.iter().copied().chain([("key", self.api_key.as_str())]),
        )?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(YttsError::ApiStatus {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }

    async fn channel_by(&self, filter: &str, value: &str) -> Result<Option<String>> {
        let res: ListResponse<ChannelItem> = self
            .get("channels", &[("part", "id"), (filter, value)])
            .await?;
        Ok(res.items.into_iter().next().map(|c| c.id))
    }

    async fn videos(&self, part: &str, ids: &[VideoId]) -> Result<Vec<VideoItem>> {
        let joined = ids.iter().map(VideoId::as_str).collect::<Vec<_>>().join(",");
        let res: ListResponse<VideoItem> = self
            .get("videos", &[("part", part), ("id", joined.as_str())])
            .await?;
        Ok(res.items)
    }
}

fn video_ids(raw: impl IntoIterator<Item = Option<String>>) -> Vec<VideoId> {
    raw.into_iter()
        .flatten()
        .filter_map(|id| VideoId::parse(&id))
        .collect()
}

#[async_trait]
impl ChannelLister for DataApi {
    async fn resolve_handle(&self, handle: &str) -> Result<String> {
        let handle = handle.trim_start_matches('@');

        for filter in ["forHandle", "forUsername"] {
            match self.channel_by(filter, handle).await {
                Ok(Some(id)) => return Ok(id),
                Ok(None) => {}
                Err(e) => debug!("channels?{}={} failed: {}", filter, handle, e),
            }
        }

        let res: ListResponse<SearchItem> = self
            .get(
                "search",
                &[("part", "id"), ("type", "channel"), ("q", handle), ("maxResults", "1")],
            )
            .await?;
        res.items
            .into_iter()
            .find_map(|item| item.id.channel_id)
            .ok_or_else(|| YttsError::ChannelNotFound {
                input: handle.to_string(),
            })
    }

    async fn page(&self, feed: &Feed, cursor: Option<&str>) -> Result<VideoPage> {
        let mut params: Vec<(&str, &str)> = vec![("maxResults", PAGE_SIZE)];
        if let Some(token) = cursor {
            params.push(("pageToken", token));
        }

        match feed {
            Feed::Channel { id, order } => {
                params.extend([
                    ("part", "id"),
                    ("type", "video"),
                    ("channelId", id.as_str()),
                    ("order", order.api_order()),
                ]);
                let res: ListResponse<SearchItem> = self.get("search", &params).await?;
                Ok(VideoPage {
                    videos: video_ids(res.items.into_iter().map(|i| i.id.video_id)),
                    next_cursor: res.next_page_token,
                })
            }
            Feed::Playlist { id } => {
                params.extend([("part", "contentDetails"), ("playlistId", id.as_str())]);
                let res: ListResponse<PlaylistItem> = self.get("playlistItems", &params).await?;
                Ok(VideoPage {
                    videos: video_ids(
                        res.items
                            .into_iter()
                            .map(|i| i.content_details.and_then(|d| d.video_id)),
                    ),
                    next_cursor: res.next_page_token,
                })
            }
        }
    }
}

#[async_trait]
impl DurationProvider for DataApi {
    async fn durations(&self, ids: &[VideoId]) -> Result<HashMap<VideoId, u64>> {
        debug_assert!(ids.len() <= DURATION_BATCH);
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let items = self.videos("contentDetails", ids).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| {
                let id = VideoId::parse(&item.id)?;
                let iso = item.content_details?.duration?;
                Some((id, parse_iso_duration(&iso)?))
            })
            .collect())
    }
}

#[async_trait]
impl MetadataProvider for DataApi {
    async fn title(&self, id: &VideoId) -> Result<String> {
        let items = self.videos("snippet", std::slice::from_ref(id)).await?;
        items
            .into_iter()
            .find_map(|item| item.snippet.map(|s| s.title))
            .ok_or_else(|| YttsError::VideoNotFound { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_page() {
        let body = r#"{
            "nextPageToken": "CDIQAA",
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "dQw4w9WgXcQ"}},
                {"id": {"kind": "youtube#channel", "channelId": "UC123"}},
                {"id": {"kind": "youtube#video", "videoId": "bad"}}
            ]
        }"#;
        let res: ListResponse<SearchItem> = serde_json::from_str(body).unwrap();
        let ids = video_ids(res.items.into_iter().map(|i| i.id.video_id));

        assert_eq!(ids, vec![VideoId::parse("dQw4w9WgXcQ").unwrap()]);
        assert_eq!(res.next_page_token.as_deref(), Some("CDIQAA"));
    }

    #[test]
    fn parses_video_details_without_items() {
        let res: ListResponse<VideoItem> = serde_json::from_str(r#"{"kind": "x"}"#).unwrap();
        assert!(res.items.is_empty());
        assert!(res.next_page_token.is_none());
    }

    #[test]
    fn parses_api_error_envelope() {
        let body = r#"{"error": {"code": 403, "message": "quotaExceeded"}}"#;
        let env: ErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(env.error.message, "quotaExceeded");
    }
}
