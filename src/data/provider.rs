//! Statistics provider seam
//!
//! The resolver and the income calculator only talk to the video platform
//! through [`StatisticsProvider`], so they can be exercised without a network.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{ChannelCandidate, ChannelId, ChannelInfo, VideoBucket, VideoSample};
use crate::error::Result;

/// Read-only access to public channel and video statistics
#[async_trait]
pub trait StatisticsProvider: Send + Sync {
    /// Fetches metadata and counters for one channel
    ///
    /// Fails with `ChannelNotFound` when the provider knows no such channel and
    /// with `QuotaOrAuth` when the request is rejected for key or quota reasons.
    async fn get_channel_info(&self, id: &ChannelId) -> Result<ChannelInfo>;

    /// Searches channels by free text, returning at most `max_results` candidates
    async fn search_channels(&self, query: &str, max_results: u32) -> Result<Vec<ChannelCandidate>>;

    /// Lists ids of videos in `bucket` published after `published_after`, newest first
    async fn list_recent_video_ids(
        &self,
        channel_id: &ChannelId,
        bucket: VideoBucket,
        published_after: DateTime<Utc>,
    ) -> Result<Vec<String>>;

    /// Looks up view counts for the given videos; an empty slice yields an empty list
    async fn get_video_statistics(&self, video_ids: &[String]) -> Result<Vec<VideoSample>>;
}
