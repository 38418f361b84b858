//! Core data models for channel income estimation
//!
//! This module contains the data types shared by the resolver, the estimator
//! and the income calculator, plus the statistics provider seam and its
//! YouTube Data API implementation.

pub mod provider;
pub mod youtube;

pub use provider::StatisticsProvider;
pub use youtube::YouTubeClient;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency every estimate is expressed in
pub const CURRENCY_USD: &str = "USD";

/// Opaque identifier of a channel on the video platform (e.g. `UC...`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of a channel's public metadata and counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub title: String,
    pub subscriber_count: u64,
    pub view_count: u64,
    pub video_count: u64,
}

/// A channel returned by a name search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelCandidate {
    pub id: ChannelId,
    /// Title reported by the search result
    pub title: String,
}

/// Which duration class a video sample was drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoBucket {
    /// Regular uploads, sampled with the provider's medium duration filter
    Standard,
    /// Short-form uploads
    Short,
}

impl VideoBucket {
    /// Value of the `videoDuration` search filter for this bucket
    pub fn duration_filter(self) -> &'static str {
        match self {
            VideoBucket::Standard => "medium",
            VideoBucket::Short => "short",
        }
    }
}

/// View count of a single recent video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSample {
    pub id: String,
    pub view_count: u64,
}

/// Mean views per video for each bucket, floored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AverageViews {
    #[serde(rename = "normal")]
    pub standard: u64,
    #[serde(rename = "shorts")]
    pub short: u64,
    /// `standard + short`
    pub total: u64,
}

impl AverageViews {
    pub fn new(standard: u64, short: u64) -> Self {
        Self {
            standard,
            short,
            total: standard + short,
        }
    }
}

/// A min/max band and its midpoint, in whole dollars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EarningsRange {
    pub min: u64,
    pub max: u64,
    pub average: u64,
}

/// Earnings over a month and over a year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodEarnings {
    pub monthly: EarningsRange,
    pub yearly: EarningsRange,
}

/// Estimated earnings per bucket and in total
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsEstimate {
    #[serde(rename = "normal")]
    pub standard: PeriodEarnings,
    #[serde(rename = "shorts")]
    pub short: PeriodEarnings,
    pub total: PeriodEarnings,
    pub currency: String,
}

/// Trailing window the video sample was collected over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Channel counters as reported in a calculation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatistics {
    pub subscribers: u64,
    pub total_views: u64,
    pub video_count: u64,
    pub average_views: AverageViews,
}

/// Full result of a channel income calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelIncome {
    pub channel_id: ChannelId,
    pub channel_title: String,
    pub statistics: ChannelStatistics,
    pub earnings: EarningsEstimate,
    pub period: SamplingPeriod,
}
