//! Channel income calculation
//!
//! Composes URL resolution, statistics fetching, view averaging and earnings
//! estimation, caching each result for a fixed time-to-live.

use std::collections::BTreeMap;

use chrono::{Duration, Months, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::CacheManager;
use crate::data::{
    AverageViews, ChannelId, ChannelIncome, ChannelStatistics, SamplingPeriod, StatisticsProvider,
    VideoBucket, VideoSample,
};
use crate::error::{Error, Result};
use crate::estimator::{average_view_count, estimate_earnings};
use crate::resolver::resolve_channel_id;

/// Time-to-live of a cached calculation (6 hours)
pub const CACHE_TTL_SECS: i64 = 21_600;

/// Language used when the caller does not pass one
pub const DEFAULT_LANGUAGE: &str = "ko";

/// Cache key for a channel URL, as supplied by the caller
pub fn cache_key(channel_url: &str) -> String {
    format!("channel:{}", channel_url)
}

/// Channel rankings response
///
/// No ranking data source exists yet: the list is always empty and the query
/// parameters are echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRankings {
    pub rankings: Vec<ChannelIncome>,
    pub query: BTreeMap<String, String>,
}

/// Calculates and caches channel income estimates
#[derive(Debug)]
pub struct IncomeCalculator<P> {
    provider: P,
    cache: CacheManager,
    cache_ttl: Duration,
}

impl<P: StatisticsProvider> IncomeCalculator<P> {
    /// Creates a calculator using the default 6 hour cache TTL
    pub fn new(provider: P, cache: CacheManager) -> Self {
        Self {
            provider,
            cache,
            cache_ttl: Duration::seconds(CACHE_TTL_SECS),
        }
    }

    /// Overrides the cache TTL
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// The statistics provider backing this calculator
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The cache holding finished calculations, keyed by [`cache_key`]
    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Estimates the income of the channel behind `channel_url`
    ///
    /// A live cache entry for the same URL is returned as-is without contacting
    /// the provider. `language` is accepted for API compatibility; estimates do
    /// not vary by language.
    ///
    /// # Errors
    /// Propagates resolver and provider errors unchanged; failures while
    /// collecting the video sample surface as `Processing`.
    pub async fn calculate_channel_income(
        &self,
        channel_url: &str,
        language: &str,
    ) -> Result<ChannelIncome> {
        let key = cache_key(channel_url);
        if let Some(cached) = self.cache.read::<ChannelIncome>(&key) {
            tracing::debug!(%key, cached_at = %cached.cached_at, "cache hit");
            return Ok(cached.data);
        }
        tracing::debug!(%key, language, "cache miss");

        let channel_id = resolve_channel_id(&self.provider, channel_url).await?;
        let channel = self.provider.get_channel_info(&channel_id).await?;

        // Millisecond precision, matching the `publishedAfter` sent upstream
        let end = Utc::now().trunc_subsecs(3);
        let start = end
            .checked_sub_months(Months::new(1))
            .unwrap_or(end - Duration::days(30));
        let period = SamplingPeriod { start, end };

        let (standard_videos, short_videos) = futures::try_join!(
            self.recent_videos(&channel_id, VideoBucket::Standard, period),
            self.recent_videos(&channel_id, VideoBucket::Short, period),
        )?;

        let average_views = AverageViews::new(
            average_view_count(&standard_videos),
            average_view_count(&short_videos),
        );
        let earnings = estimate_earnings(&average_views);

        let result = ChannelIncome {
            channel_id,
            channel_title: channel.title,
            statistics: ChannelStatistics {
                subscribers: channel.subscriber_count,
                total_views: channel.view_count,
                video_count: channel.video_count,
                average_views,
            },
            earnings,
            period,
        };

        if let Err(err) = self.cache.write(&key, &result, self.cache_ttl) {
            tracing::warn!(%key, error = %err, "failed to cache calculation");
        }
        tracing::info!(
            channel_id = %result.channel_id,
            monthly_average = result.earnings.total.monthly.average,
            "calculated channel income"
        );

        Ok(result)
    }

    /// Fetches view counts of one bucket's uploads within `period`
    async fn recent_videos(
        &self,
        channel_id: &ChannelId,
        bucket: VideoBucket,
        period: SamplingPeriod,
    ) -> Result<Vec<VideoSample>> {
        let ids = self
            .provider
            .list_recent_video_ids(channel_id, bucket, period.start)
            .await
            .map_err(|e| Error::processing("fetch recent videos", e))?;

        self.provider
            .get_video_statistics(&ids)
            .await
            .map_err(|e| Error::processing("fetch video statistics", e))
    }

    /// Returns channel rankings for the given query parameters
    pub async fn channel_rankings(&self, query: BTreeMap<String, String>) -> Result<ChannelRankings> {
        Ok(ChannelRankings {
            rankings: Vec::new(),
            query,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::fake::FakeProvider;
    use crate::error::ErrorKind;
    use std::time::Duration as StdDuration;

    const HANDLE_URL: &str = "https://www.youtube.com/@chef";

    fn provider() -> FakeProvider {
        FakeProvider::new()
            .with_search("chef", &[("UCchef", "chef")])
            .with_channel("UCchef", "Chef", 12_000)
            .with_videos(VideoBucket::Standard, &[90_000, 110_000])
            .with_videos(VideoBucket::Short, &[40_000, 60_000])
    }

    #[tokio::test]
    async fn test_full_calculation() {
        let calculator = IncomeCalculator::new(provider(), CacheManager::new());

        let income = calculator
            .calculate_channel_income(HANDLE_URL, DEFAULT_LANGUAGE)
            .await
            .expect("Calculation should succeed");

        assert_eq!(income.channel_id, ChannelId::new("UCchef"));
        assert_eq!(income.channel_title, "Chef");
        assert_eq!(income.statistics.subscribers, 12_000);
        assert_eq!(income.statistics.total_views, 1_200_000);
        assert_eq!(income.statistics.video_count, 42);
        assert_eq!(income.statistics.average_views, AverageViews::new(100_000, 50_000));
        assert_eq!(income.earnings.total.monthly.min, 210);
        assert_eq!(income.earnings.total.monthly.max, 750);
        assert_eq!(income.earnings.total.monthly.average, 480);
        assert!(income.period.start < income.period.end);
        assert!(income.period.end - income.period.start >= Duration::days(28));
    }

    #[tokio::test]
    async fn test_period_has_millisecond_precision() {
        let calculator = IncomeCalculator::new(provider(), CacheManager::new());

        let income = calculator
            .calculate_channel_income(HANDLE_URL, DEFAULT_LANGUAGE)
            .await
            .expect("Calculation should succeed");

        assert_eq!(income.period.start.timestamp_subsec_nanos() % 1_000_000, 0);
        assert_eq!(income.period.end.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[tokio::test]
    async fn test_channel_without_recent_videos_estimates_zero() {
        let provider = FakeProvider::new().with_channel("UCquiet", "Quiet", 10);
        let calculator = IncomeCalculator::new(provider, CacheManager::new());

        let income = calculator
            .calculate_channel_income("https://www.youtube.com/channel/UCquiet", "en")
            .await
            .expect("Calculation should succeed");

        assert_eq!(income.statistics.average_views, AverageViews::default());
        assert_eq!(income.earnings.total.yearly.max, 0);
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let calculator = IncomeCalculator::new(provider(), CacheManager::new());

        let first = calculator
            .calculate_channel_income(HANDLE_URL, DEFAULT_LANGUAGE)
            .await
            .expect("First calculation should succeed");
        let calls_after_first = calculator.provider().calls();

        let second = calculator
            .calculate_channel_income(HANDLE_URL, DEFAULT_LANGUAGE)
            .await
            .expect("Second calculation should succeed");

        assert_eq!(calculator.provider().calls(), calls_after_first);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_fresh_fetch() {
        let calculator = IncomeCalculator::new(provider(), CacheManager::new());

        calculator
            .calculate_channel_income(HANDLE_URL, DEFAULT_LANGUAGE)
            .await
            .expect("First calculation should succeed");
        let calls_after_first = calculator.provider().calls();

        assert!(calculator.cache().expire(&cache_key(HANDLE_URL)));
        calculator
            .calculate_channel_income(HANDLE_URL, DEFAULT_LANGUAGE)
            .await
            .expect("Second calculation should succeed");

        assert_eq!(calculator.provider().calls(), calls_after_first * 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_never_serves_cache() {
        let calculator =
            IncomeCalculator::new(provider(), CacheManager::new()).with_cache_ttl(Duration::zero());

        calculator
            .calculate_channel_income(HANDLE_URL, DEFAULT_LANGUAGE)
            .await
            .expect("First calculation should succeed");
        let calls_after_first = calculator.provider().calls();
        tokio::time::sleep(StdDuration::from_millis(10)).await;

        calculator
            .calculate_channel_income(HANDLE_URL, DEFAULT_LANGUAGE)
            .await
            .expect("Second calculation should succeed");

        assert!(calculator.provider().calls() > calls_after_first);
    }

    #[tokio::test]
    async fn test_cache_key_uses_raw_url() {
        let calculator = IncomeCalculator::new(provider(), CacheManager::new());

        calculator
            .calculate_channel_income(HANDLE_URL, DEFAULT_LANGUAGE)
            .await
            .expect("Calculation should succeed");

        assert!(calculator
            .cache()
            .read::<ChannelIncome>("channel:https://www.youtube.com/@chef")
            .is_some());
    }

    #[tokio::test]
    async fn test_quota_error_propagates_and_is_not_cached() {
        let provider = FakeProvider::new()
            .with_search("chef", &[("UCchef", "chef")])
            .with_channel_info_error(ErrorKind::QuotaOrAuth);
        let calculator = IncomeCalculator::new(provider, CacheManager::new());

        let err = calculator
            .calculate_channel_income(HANDLE_URL, DEFAULT_LANGUAGE)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::QuotaOrAuth);
        assert!(calculator.cache().is_empty());
    }

    #[tokio::test]
    async fn test_video_list_failure_is_processing_error() {
        let provider = provider().with_failing_videos(VideoBucket::Short);
        let calculator = IncomeCalculator::new(provider, CacheManager::new());

        let err = calculator
            .calculate_channel_income(HANDLE_URL, DEFAULT_LANGUAGE)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Processing);
        let message = err.to_string();
        assert!(message.starts_with("Failed to fetch recent videos"), "{}", message);
        assert!(message.contains("quota has been exceeded"), "{}", message);
        assert!(calculator.cache().is_empty());
    }

    #[tokio::test]
    async fn test_video_statistics_failure_is_processing_error() {
        let provider = provider().with_failing_statistics();
        let calculator = IncomeCalculator::new(provider, CacheManager::new());

        let err = calculator
            .calculate_channel_income(HANDLE_URL, DEFAULT_LANGUAGE)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Processing);
        assert_eq!(
            err.to_string(),
            "Failed to fetch video statistics: Failed to load video batch: connection reset"
        );
        assert!(calculator.cache().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_channel_is_not_found() {
        let calculator = IncomeCalculator::new(FakeProvider::new(), CacheManager::new());

        let err = calculator
            .calculate_channel_income("https://www.youtube.com/channel/UCmissing", DEFAULT_LANGUAGE)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ChannelNotFound);
    }

    #[tokio::test]
    async fn test_invalid_url_makes_no_calls() {
        let calculator = IncomeCalculator::new(FakeProvider::new(), CacheManager::new());

        let err = calculator
            .calculate_channel_income("not a url", DEFAULT_LANGUAGE)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidChannelUrl);
        assert_eq!(calculator.provider().calls(), 0);
    }

    #[tokio::test]
    async fn test_rankings_echo_query() {
        let calculator = IncomeCalculator::new(FakeProvider::new(), CacheManager::new());
        let query = BTreeMap::from([("country".to_string(), "KR".to_string())]);

        let rankings = calculator
            .channel_rankings(query.clone())
            .await
            .expect("Rankings should succeed");

        assert!(rankings.rankings.is_empty());
        assert_eq!(rankings.query, query);
    }
}
