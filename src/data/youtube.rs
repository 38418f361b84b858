//! YouTube Data API v3 client
//!
//! This module fetches channel metadata, channel search results, recent upload
//! ids and per-video view counts, authenticating every request with an API key.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::instrument;

use super::{ChannelCandidate, ChannelId, ChannelInfo, StatisticsProvider, VideoBucket, VideoSample};
use crate::error::{Error, Result};

/// Base URL for the YouTube Data API
pub const YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Maximum number of ids accepted by one `videos.list` call
pub const VIDEO_BATCH_SIZE: usize = 50;

/// Maximum number of recent uploads sampled per bucket
const RECENT_VIDEO_LIMIT: &str = "50";

/// Client for the YouTube Data API
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    /// Creates a client for the public API endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: YOUTUBE_API_BASE_URL.to_string(),
        }
    }

    /// Points the client at a different API root (mock servers, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Uses a custom HTTP client, e.g. one with transport timeouts configured
    pub fn with_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// Issues a GET against `path` and decodes the JSON body
    ///
    /// The API key is appended to every request. 401/403 become `QuotaOrAuth`,
    /// every other failure becomes `Provider` tagged with `context`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        context: &str,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        tracing::debug!(path, ?params, "YouTube API request");

        let response = self
            .http_client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| Error::provider(context, e.without_url()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::QuotaOrAuth(format!("{}: {}", status, body.trim())));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::provider(
                context,
                format!("status {}: {}", status, body.trim()),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::provider(context, e.without_url()))
    }
}

#[async_trait]
impl StatisticsProvider for YouTubeClient {
    #[instrument(skip(self))]
    async fn get_channel_info(&self, id: &ChannelId) -> Result<ChannelInfo> {
        let params = [("part", "snippet,statistics"), ("id", id.as_str())];
        let response: ListResponse<ChannelResource> = self
            .get_json("channels", &params, "fetch channel info")
            .await?;

        let channel = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| Error::ChannelNotFound(id.to_string()))?;
        parse_channel(channel)
    }

    #[instrument(skip(self))]
    async fn search_channels(&self, query: &str, max_results: u32) -> Result<Vec<ChannelCandidate>> {
        let max_results = max_results.to_string();
        let params = [
            ("part", "snippet"),
            ("type", "channel"),
            ("q", query),
            ("maxResults", max_results.as_str()),
        ];
        let response: ListResponse<SearchResult> = self
            .get_json("search", &params, "search channels")
            .await?;

        Ok(parse_candidates(response.items))
    }

    #[instrument(skip(self))]
    async fn list_recent_video_ids(
        &self,
        channel_id: &ChannelId,
        bucket: VideoBucket,
        published_after: DateTime<Utc>,
    ) -> Result<Vec<String>> {
        let published_after = published_after.to_rfc3339_opts(SecondsFormat::Millis, true);
        let params = [
            ("part", "id"),
            ("channelId", channel_id.as_str()),
            ("order", "date"),
            ("type", "video"),
            ("videoDuration", bucket.duration_filter()),
            ("publishedAfter", published_after.as_str()),
            ("maxResults", RECENT_VIDEO_LIMIT),
        ];
        let response: ListResponse<SearchResult> = self
            .get_json("search", &params, "list recent videos")
            .await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect())
    }

    #[instrument(skip(self, video_ids), fields(count = video_ids.len()))]
    async fn get_video_statistics(&self, video_ids: &[String]) -> Result<Vec<VideoSample>> {
        let mut samples = Vec::with_capacity(video_ids.len());

        for batch in video_ids.chunks(VIDEO_BATCH_SIZE) {
            let ids = batch.join(",");
            let params = [("part", "statistics"), ("id", ids.as_str())];
            let response: ListResponse<VideoResource> = self
                .get_json("videos", &params, "fetch video statistics")
                .await?;

            for video in response.items {
                samples.push(parse_video(video)?);
            }
        }

        Ok(samples)
    }
}

/// Parses a numeric counter that the API encodes as a string
///
/// Absent counters (hidden subscriber counts, missing view counts) read as 0.
fn parse_count(field: &str, value: Option<&str>) -> Result<u64> {
    match value {
        None => Ok(0),
        Some(raw) => raw.trim().parse().map_err(|_| {
            Error::provider("parse API response", format!("invalid {}: '{}'", field, raw))
        }),
    }
}

fn parse_channel(resource: ChannelResource) -> Result<ChannelInfo> {
    let stats = resource.statistics;
    Ok(ChannelInfo {
        id: ChannelId::new(resource.id),
        title: resource.snippet.title,
        subscriber_count: parse_count("subscriberCount", stats.subscriber_count.as_deref())?,
        view_count: parse_count("viewCount", stats.view_count.as_deref())?,
        video_count: parse_count("videoCount", stats.video_count.as_deref())?,
    })
}

fn parse_candidates(items: Vec<SearchResult>) -> Vec<ChannelCandidate> {
    items
        .into_iter()
        .filter_map(|item| {
            let snippet = item.snippet?;
            let id = snippet.channel_id.or(item.id.channel_id)?;
            Some(ChannelCandidate {
                id: ChannelId::new(id),
                title: snippet.channel_title.unwrap_or_default(),
            })
        })
        .collect()
}

fn parse_video(resource: VideoResource) -> Result<VideoSample> {
    Ok(VideoSample {
        view_count: parse_count("viewCount", resource.statistics.view_count.as_deref())?,
        id: resource.id,
    })
}

/// Generic `*.list` response envelope
#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// A `channel` resource with `snippet` and `statistics` parts
#[derive(Debug, Deserialize)]
struct ChannelResource {
    id: String,
    snippet: ChannelSnippet,
    #[serde(default)]
    statistics: ChannelStatisticsPart,
}

#[derive(Debug, Deserialize)]
struct ChannelSnippet {
    title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatisticsPart {
    subscriber_count: Option<String>,
    view_count: Option<String>,
    video_count: Option<String>,
}

/// A `search` result; which id field is set depends on the result type
#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    id: SearchResultId,
    snippet: Option<SearchSnippet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultId {
    channel_id: Option<String>,
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchSnippet {
    channel_id: Option<String>,
    channel_title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoResource {
    id: String,
    #[serde(default)]
    statistics: VideoStatisticsPart,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatisticsPart {
    view_count: Option<String>,
}
