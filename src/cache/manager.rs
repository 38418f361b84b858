//! In-memory cache manager with per-entry expiry
//!
//! Provides a `CacheManager` that stores serializable data as JSON values with
//! expiry timestamps. Cloning the manager shares the same underlying store.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A single cached value
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The cached data
    data: serde_json::Value,
    /// When the data was cached
    cached_at: DateTime<Utc>,
    /// When the cache entry expires
    expires_at: DateTime<Utc>,
}

/// Result of reading a live entry from the cache
#[derive(Debug)]
pub struct CachedData<T> {
    /// The cached data
    pub data: T,
    /// When the data was originally cached
    pub cached_at: DateTime<Utc>,
    /// When the entry stops being served
    pub expires_at: DateTime<Utc>,
}

/// Manages reading and writing cached data in memory
///
/// One instance is created at process start and shared (by cloning) with every
/// component that needs it. There is no background sweeping: an expired entry
/// stays in the map until the next read of its key removes it.
#[derive(Debug, Clone, Default)]
pub struct CacheManager {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl CacheManager {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes data to the cache with the given time-to-live
    ///
    /// Overwrites any existing entry for `key`.
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if the data cannot be serialized
    pub fn write<T: Serialize>(
        &self,
        key: &str,
        data: &T,
        ttl: Duration,
    ) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(data)?;
        let now = Utc::now();
        let entry = CacheEntry {
            data: value,
            cached_at: now,
            expires_at: now + ttl,
        };

        self.entries.lock().insert(key.to_string(), entry);
        Ok(())
    }

    /// Reads data from the cache
    ///
    /// Returns `None` if the entry doesn't exist, has expired, or cannot be
    /// deserialized as `T`. An expired entry is removed as a side effect.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<CachedData<T>> {
        let entry = {
            let mut entries = self.entries.lock();
            let entry = entries.get(key)?;
            if Utc::now() > entry.expires_at {
                entries.remove(key);
                tracing::debug!(key, "evicted expired cache entry");
                return None;
            }
            entry.clone()
        };

        let data = serde_json::from_value(entry.data).ok()?;
        Some(CachedData {
            data,
            cached_at: entry.cached_at,
            expires_at: entry.expires_at,
        })
    }

    /// Forces the entry for `key` to expire
    ///
    /// The entry is not removed; the next read treats it as expired and evicts it.
    pub fn expire(&self, key: &str) -> bool {
        match self.entries.lock().get_mut(key) {
            Some(entry) => {
                entry.expires_at = Utc::now() - Duration::seconds(1);
                true
            }
            None => false,
        }
    }

    /// Number of stored entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::thread;
    use std::time::Duration as StdDuration;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_read_returns_none_for_missing_key() {
        let cache = CacheManager::new();

        let result: Option<CachedData<TestData>> = cache.read("nonexistent_key");

        assert!(result.is_none(), "Should return None for missing key");
    }

    #[test]
    fn test_read_returns_fresh_data() {
        let cache = CacheManager::new();
        let data = TestData {
            name: "fresh".to_string(),
            value: 100,
        };

        cache
            .write("fresh_key", &data, Duration::hours(6))
            .expect("Write should succeed");

        let result: CachedData<TestData> = cache.read("fresh_key").expect("Should read fresh cache");

        assert_eq!(result.data, data);
        assert!(result.expires_at > Utc::now());
    }

    #[test]
    fn test_expired_entry_is_absent_and_evicted() {
        let cache = CacheManager::new();
        let data = TestData {
            name: "expired".to_string(),
            value: 0,
        };

        // Zero TTL - expires immediately
        cache
            .write("expired_key", &data, Duration::zero())
            .expect("Write should succeed");
        thread::sleep(StdDuration::from_millis(10));

        assert_eq!(cache.len(), 1, "Expired entry stays until read");
        let result: Option<CachedData<TestData>> = cache.read("expired_key");

        assert!(result.is_none(), "Expired entry should be treated as absent");
        assert!(cache.is_empty(), "Expired entry should be removed on read");
    }

    #[test]
    fn test_manual_expiry() {
        let cache = CacheManager::new();
        let data = TestData {
            name: "manual".to_string(),
            value: 7,
        };

        cache
            .write("manual_key", &data, Duration::hours(6))
            .expect("Write should succeed");

        assert!(cache.expire("manual_key"));
        assert!(!cache.expire("missing_key"));
        assert!(cache.read::<TestData>("manual_key").is_none());
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = CacheManager::new();
        let shared = cache.clone();
        let data = TestData {
            name: "shared".to_string(),
            value: 3,
        };

        cache
            .write("shared_key", &data, Duration::hours(1))
            .expect("Write should succeed");

        let result: CachedData<TestData> = shared.read("shared_key").expect("Clone should see entry");
        assert_eq!(result.data, data);
    }

    #[test]
    fn test_cached_at_timestamp_is_recorded() {
        let cache = CacheManager::new();
        let data = TestData {
            name: "timestamp".to_string(),
            value: 999,
        };

        let before = Utc::now();
        cache
            .write("timestamp_key", &data, Duration::hours(24))
            .expect("Write should succeed");
        let after = Utc::now();

        let result: CachedData<TestData> = cache.read("timestamp_key").expect("Should read cache");

        assert!(result.cached_at >= before, "cached_at should be after write started");
        assert!(result.cached_at <= after, "cached_at should be before write finished");
    }

    #[test]
    fn test_overwrite_existing_cache() {
        let cache = CacheManager::new();
        let data1 = TestData {
            name: "first".to_string(),
            value: 1,
        };
        let data2 = TestData {
            name: "second".to_string(),
            value: 2,
        };

        cache
            .write("overwrite_key", &data1, Duration::hours(24))
            .expect("First write should succeed");
        cache
            .write("overwrite_key", &data2, Duration::hours(24))
            .expect("Second write should succeed");

        let result: CachedData<TestData> = cache.read("overwrite_key").expect("Should read cache");

        assert_eq!(result.data, data2, "Cache should contain latest data");
    }

    #[test]
    fn test_read_with_wrong_type_returns_none() {
        let cache = CacheManager::new();
        cache
            .write("typed_key", &"just a string", Duration::hours(1))
            .expect("Write should succeed");

        assert!(cache.read::<TestData>("typed_key").is_none());
    }
}
