//! Structured-record call site: the project list and detail caches.
//!
//! The list is a single slot with a five-minute freshness window; details
//! live in a capacity-bounded map with a ten-minute window. Neither has a
//! fallback resource.

use crate::resource_cache::{FetchOptions, ResourceCache, ResourceCacheConfig};
use loadstone_config::RecordsConfig;
use loadstone_core::{FetchResult, RecordDetail, RecordList, RecordStore};
use loadstone_resilience::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Cache key of the single record-list slot
const LIST_KEY: &str = "records:list";

/// Configuration for the record caches.
#[derive(Debug, Clone)]
pub struct RecordCacheConfig {
    /// Freshness window of the list slot
    pub list_ttl: Duration,
    /// Freshness window of detail entries
    pub detail_ttl: Duration,
    /// Maximum number of cached details
    pub detail_capacity: usize,
    /// Retry policy for both list and detail loads
    pub retry: RetryPolicy,
}

impl Default for RecordCacheConfig {
    fn default() -> Self {
        Self {
            list_ttl: Duration::from_secs(5 * 60),
            detail_ttl: Duration::from_secs(10 * 60),
            detail_capacity: 64,
            retry: RetryPolicy::default(),
        }
    }
}

impl From<&RecordsConfig> for RecordCacheConfig {
    fn from(config: &RecordsConfig) -> Self {
        Self {
            list_ttl: config.list_ttl,
            detail_ttl: config.detail_ttl,
            detail_capacity: config.detail_capacity,
            retry: config.retry.to_policy(),
        }
    }
}

/// Cached view over a [`RecordStore`].
pub struct RecordCache {
    store: Arc<dyn RecordStore>,
    list: ResourceCache<RecordList>,
    detail: ResourceCache<RecordDetail>,
}

impl RecordCache {
    /// Create a record cache over `store`
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, config: RecordCacheConfig) -> Self {
        let list = ResourceCache::new(ResourceCacheConfig {
            name: "record-list",
            max_capacity: 1,
            ttl: Some(config.list_ttl),
            retry: config.retry.clone(),
        });
        let detail = ResourceCache::new(ResourceCacheConfig {
            name: "record-detail",
            max_capacity: config.detail_capacity,
            ttl: Some(config.detail_ttl),
            retry: config.retry,
        });
        Self { store, list, detail }
    }

    /// Create a record cache from the application config section
    #[must_use]
    pub fn from_config(store: Arc<dyn RecordStore>, config: &RecordsConfig) -> Self {
        Self::new(store, config.into())
    }

    /// Fetch the record list, serving a fresh cached copy unless
    /// `force_refresh` is set.
    ///
    /// # Errors
    /// Returns the terminal load error once retries are exhausted
    pub async fn fetch_list(&self, force_refresh: bool) -> FetchResult<RecordList> {
        let store = Arc::clone(&self.store);
        self.list
            .fetch(
                LIST_KEY,
                move || {
                    let store = Arc::clone(&store);
                    async move { store.load_list().await }
                },
                FetchOptions {
                    force_refresh,
                    fallback: None,
                },
            )
            .await
    }

    /// Fetch one record's detail by id.
    ///
    /// # Errors
    /// Returns the terminal load error once retries are exhausted
    pub async fn fetch_detail(&self, id: &str, force_refresh: bool) -> FetchResult<RecordDetail> {
        let store = Arc::clone(&self.store);
        let record_id = id.to_string();
        self.detail
            .fetch(
                &format!("record:{id}"),
                move || {
                    let store = Arc::clone(&store);
                    let record_id = record_id.clone();
                    async move { store.load_detail(&record_id).await }
                },
                FetchOptions {
                    force_refresh,
                    fallback: None,
                },
            )
            .await
    }

    /// Empty both caches; used for explicit invalidation and test isolation
    pub fn clear_all(&self) {
        self.list.clear();
        self.detail.clear();
        info!("Record caches cleared");
    }

    /// Number of cached detail entries
    #[must_use]
    pub fn detail_len(&self) -> usize {
        self.detail.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use loadstone_core::{FetchError, RecordSummary};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    struct CountingStore {
        list_calls: AtomicUsize,
        detail_calls: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                list_calls: AtomicUsize::new(0),
                detail_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RecordStore for CountingStore {
        async fn load_list(&self) -> Result<RecordList, FetchError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(RecordList {
                records: vec![RecordSummary {
                    id: "r1".to_string(),
                    title: "Bookshelf".to_string(),
                    created_at: Utc::now(),
                }],
            })
        }

        async fn load_detail(&self, id: &str) -> Result<RecordDetail, FetchError> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            Ok(RecordDetail {
                id: id.to_string(),
                title: "Bookshelf".to_string(),
                description: String::new(),
                steps: vec![],
                materials: vec![],
                created_at: Utc::now(),
            })
        }
    }

    fn fast_config(list_ttl: Duration) -> RecordCacheConfig {
        RecordCacheConfig {
            list_ttl,
            detail_ttl: Duration::from_secs(60),
            detail_capacity: 4,
            retry: RetryPolicy {
                max_attempts: 1,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
                backoff_multiplier: 2.0,
            },
        }
    }

    #[tokio::test]
    async fn test_list_ttl_scenario() {
        // The 5-minute production window, scaled to milliseconds: a fetch
        // inside the window is a hit with zero loader invocations, a fetch
        // past it triggers exactly one new load
        let store = CountingStore::new();
        let cache = RecordCache::new(store.clone(), fast_config(Duration::from_millis(60)));

        let first = cache.fetch_list(false).await.expect("initial load");
        assert!(!first.served_from_cache);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 1);

        sleep(Duration::from_millis(20)).await;
        let within = cache.fetch_list(false).await.expect("within window");
        assert!(within.served_from_cache);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 1);

        sleep(Duration::from_millis(60)).await;
        let past = cache.fetch_list(false).await.expect("past window");
        assert!(!past.served_from_cache);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_force_refresh_reloads_list() {
        let store = CountingStore::new();
        let cache = RecordCache::new(store.clone(), fast_config(Duration::from_secs(60)));

        cache.fetch_list(false).await.expect("initial load");
        let refreshed = cache.fetch_list(true).await.expect("forced refresh");
        assert!(!refreshed.served_from_cache);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_detail_cached_per_id() {
        let store = CountingStore::new();
        let cache = RecordCache::new(store.clone(), fast_config(Duration::from_secs(60)));

        let a = cache.fetch_detail("r1", false).await.expect("detail r1");
        assert_eq!(a.value.id, "r1");
        let b = cache.fetch_detail("r2", false).await.expect("detail r2");
        assert_eq!(b.value.id, "r2");
        let again = cache.fetch_detail("r1", false).await.expect("detail r1 again");
        assert!(again.served_from_cache);

        assert_eq!(store.detail_calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.detail_len(), 2);
    }

    #[tokio::test]
    async fn test_detail_capacity_is_bounded() {
        let store = CountingStore::new();
        let cache = RecordCache::new(store.clone(), fast_config(Duration::from_secs(60)));

        for i in 0..6 {
            cache
                .fetch_detail(&format!("r{i}"), false)
                .await
                .expect("detail load");
        }
        assert!(cache.detail_len() <= 4);
    }

    #[tokio::test]
    async fn test_clear_all_empties_both() {
        let store = CountingStore::new();
        let cache = RecordCache::new(store.clone(), fast_config(Duration::from_secs(60)));

        cache.fetch_list(false).await.expect("list");
        cache.fetch_detail("r1", false).await.expect("detail");
        cache.clear_all();

        let list = cache.fetch_list(false).await.expect("list after clear");
        assert!(!list.served_from_cache);
        assert_eq!(cache.detail_len(), 0);
    }
}
