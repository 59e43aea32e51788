//! The resilient resource cache composition root.
//!
//! `fetch` turns "get resource by key" into a value: cache lookup first,
//! then a deduplicated, retried load, then an optional one-level fallback.
//! The ordering guarantees at most one in-flight load per key, and a
//! fallback's result is cached under its own key so the primary is
//! re-attempted by later callers instead of silently pinning to the
//! fallback.

use futures::future::{BoxFuture, FutureExt};
use loadstone_core::{FetchError, FetchResult, Fetched};
use loadstone_resilience::{run_with_retry, CacheStats, InFlight, RetryPolicy, TtlCache};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

type BoxLoader<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, FetchError>> + Send + Sync>;

/// Configuration for one resource category.
#[derive(Debug, Clone)]
pub struct ResourceCacheConfig {
    /// Category label used in logs (e.g. "record-detail")
    pub name: &'static str,
    /// Maximum number of cached entries
    pub max_capacity: usize,
    /// Freshness window; `None` caches without expiry
    pub ttl: Option<Duration>,
    /// Retry policy applied to every load in this category
    pub retry: RetryPolicy,
}

/// A secondary key/loader substituted only after the primary's retries are
/// exhausted. Never chained to a further fallback.
pub struct FallbackSource<T> {
    key: String,
    loader: BoxLoader<T>,
}

impl<T> FallbackSource<T> {
    /// Create a fallback source
    pub fn new<F, Fut>(key: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        Self {
            key: key.into(),
            loader: Arc::new(move || loader().boxed()),
        }
    }

    /// The fallback resource key
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<T> std::fmt::Debug for FallbackSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackSource").field("key", &self.key).finish()
    }
}

/// Per-call fetch options.
#[derive(Debug)]
pub struct FetchOptions<T> {
    /// Bypass the cache lookup (deduplication and retry still apply)
    pub force_refresh: bool,
    /// Fallback source tried once after the primary's retries are exhausted
    pub fallback: Option<FallbackSource<T>>,
}

impl<T> Default for FetchOptions<T> {
    fn default() -> Self {
        Self {
            force_refresh: false,
            fallback: None,
        }
    }
}

impl<T> FetchOptions<T> {
    /// Options that bypass the cache lookup
    #[must_use]
    pub fn refresh() -> Self {
        Self {
            force_refresh: true,
            fallback: None,
        }
    }

    /// Set the fallback source
    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackSource<T>) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

/// Resilient cache for one resource category.
///
/// Owns its TTL cache and pending-load registry as constructor-injected
/// instances — there is no ambient global state, so concurrency discipline
/// and test isolation are per-instance properties.
#[derive(Debug)]
pub struct ResourceCache<T> {
    config: ResourceCacheConfig,
    cache: Arc<TtlCache<T>>,
    inflight: InFlight<T>,
}

impl<T: Clone + Send + Sync + 'static> ResourceCache<T> {
    /// Create a resource cache for one category
    #[must_use]
    pub fn new(config: ResourceCacheConfig) -> Self {
        let cache = Arc::new(TtlCache::new(config.name, config.max_capacity));
        Self {
            config,
            cache,
            inflight: InFlight::new(),
        }
    }

    /// Fetch the resource stored under `key`.
    ///
    /// Steps, in order: cache lookup (skipped on `force_refresh`), then a
    /// deduplicated load wrapped in the retry executor, then cache the
    /// success, then at most one fallback substitution.
    ///
    /// # Errors
    /// Returns the primary load's terminal error once retries (and any
    /// fallback) are exhausted.
    pub async fn fetch<F, Fut>(
        &self,
        key: &str,
        loader: F,
        options: FetchOptions<T>,
    ) -> FetchResult<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let started = Instant::now();

        if !options.force_refresh {
            if let Some(value) = self.cache.get(key) {
                return Ok(Fetched::cached(value, started.elapsed()));
            }
        }

        let loader: BoxLoader<T> = Arc::new(move || loader().boxed());

        match self.load(key, loader).await {
            Ok(value) => Ok(Fetched::loaded(value, started.elapsed())),
            Err(primary_err) => {
                let Some(fallback) = options.fallback else {
                    return Err(primary_err);
                };
                if fallback.key == key {
                    return Err(primary_err);
                }

                warn!(
                    cache = self.config.name,
                    key,
                    fallback_key = %fallback.key,
                    error = %primary_err,
                    "Primary load failed, trying fallback"
                );

                match self.load(&fallback.key, fallback.loader).await {
                    Ok(value) => Ok(Fetched::loaded(value, started.elapsed())),
                    Err(fallback_err) => {
                        warn!(
                            cache = self.config.name,
                            fallback_key = %fallback.key,
                            error = %fallback_err,
                            "Fallback load also failed"
                        );
                        // The caller asked for the primary resource; its
                        // terminal error is the relevant diagnosis
                        Err(primary_err)
                    }
                }
            }
        }
    }

    /// Run one deduplicated, retried load for `key`, caching the success.
    ///
    /// The cache write happens inside the deduplicated producer, so exactly
    /// one write occurs per settled load no matter how many callers joined.
    /// The producer runs on its own task, so a caller that drops its future
    /// mid-flight does not cancel the load or the cache write.
    async fn load(&self, key: &str, loader: BoxLoader<T>) -> Result<T, FetchError> {
        let cache = Arc::clone(&self.cache);
        let policy = self.config.retry.clone();
        let ttl = self.config.ttl;
        let owned_key = key.to_string();

        self.inflight
            .run(key, move || async move {
                let value = run_with_retry(&policy, || (loader)()).await?;
                cache.set(&owned_key, value.clone(), ttl);
                Ok(value)
            })
            .await
    }

    /// Empty the cache unconditionally
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Number of cached entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Snapshot of the cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
