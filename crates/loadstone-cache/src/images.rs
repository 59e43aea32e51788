//! Binary-resource call site: the image loader.
//!
//! Images are cached per URL without expiry, each attempt is time-boxed by
//! the underlying loader, and a single fallback URL may be substituted once
//! the primary's retries are exhausted.

use crate::resource_cache::{FallbackSource, FetchOptions, ResourceCache, ResourceCacheConfig};
use loadstone_config::ImagesConfig;
use loadstone_core::{BinaryLoader, FetchResult, ImageHandle};
use loadstone_resilience::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the image loader.
#[derive(Debug, Clone)]
pub struct ImageLoaderConfig {
    /// Maximum number of cached images
    pub capacity: usize,
    /// Time box applied by the loader to each individual attempt
    pub attempt_timeout: Duration,
    /// Default fallback URL, substituted when a load fails outright
    pub fallback_url: Option<String>,
    /// Retry policy per image load
    pub retry: RetryPolicy,
}

impl Default for ImageLoaderConfig {
    fn default() -> Self {
        Self {
            capacity: 128,
            attempt_timeout: Duration::from_secs(10),
            fallback_url: None,
            retry: RetryPolicy {
                max_attempts: 2,
                base_delay: Duration::from_millis(300),
                max_delay: Duration::from_secs(5),
                backoff_multiplier: 2.0,
            },
        }
    }
}

impl From<&ImagesConfig> for ImageLoaderConfig {
    fn from(config: &ImagesConfig) -> Self {
        Self {
            capacity: config.capacity,
            attempt_timeout: config.attempt_timeout,
            fallback_url: config.fallback_url.clone(),
            retry: config.retry.to_policy(),
        }
    }
}

/// Per-call image options.
#[derive(Debug, Clone, Default)]
pub struct ImageOptions {
    /// Bypass the cache lookup
    pub force_refresh: bool,
    /// Fallback URL for this call, overriding the configured default
    pub fallback_url: Option<String>,
}

impl ImageOptions {
    /// Options with a call-specific fallback URL
    #[must_use]
    pub fn with_fallback(url: impl Into<String>) -> Self {
        Self {
            force_refresh: false,
            fallback_url: Some(url.into()),
        }
    }
}

/// Cached, retrying view over a [`BinaryLoader`].
pub struct ImageLoader {
    loader: Arc<dyn BinaryLoader>,
    cache: ResourceCache<ImageHandle>,
    config: ImageLoaderConfig,
}

impl ImageLoader {
    /// Create an image loader over `loader`
    #[must_use]
    pub fn new(loader: Arc<dyn BinaryLoader>, config: ImageLoaderConfig) -> Self {
        let cache = ResourceCache::new(ResourceCacheConfig {
            name: "image",
            max_capacity: config.capacity,
            // Image bytes for a URL never go stale; capacity pressure is
            // the only eviction trigger
            ttl: None,
            retry: config.retry.clone(),
        });
        Self {
            loader,
            cache,
            config,
        }
    }

    /// Create an image loader from the application config section
    #[must_use]
    pub fn from_config(loader: Arc<dyn BinaryLoader>, config: &ImagesConfig) -> Self {
        Self::new(loader, config.into())
    }

    /// Load the image at `url`, serving the cached copy when present.
    ///
    /// # Errors
    /// Returns the primary URL's terminal error once retries (and any
    /// fallback) are exhausted
    pub async fn load_image(&self, url: &str, options: ImageOptions) -> FetchResult<ImageHandle> {
        let fallback_url = options
            .fallback_url
            .or_else(|| self.config.fallback_url.clone())
            .filter(|fb| fb != url);

        let fallback = fallback_url.map(|fb| {
            FallbackSource::new(fb.clone(), self.url_loader(&fb))
        });

        self.cache
            .fetch(
                url,
                self.url_loader(url),
                FetchOptions {
                    force_refresh: options.force_refresh,
                    fallback,
                },
            )
            .await
    }

    /// Empty the image cache unconditionally
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Number of cached images
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Build a reusable load closure for one URL
    fn url_loader(
        &self,
        url: &str,
    ) -> impl Fn() -> futures::future::BoxFuture<'static, Result<ImageHandle, loadstone_core::FetchError>>
           + Send
           + Sync
           + 'static {
        use futures::FutureExt;

        let loader = Arc::clone(&self.loader);
        let url = url.to_string();
        let timeout = self.config.attempt_timeout;

        move || {
            let loader = Arc::clone(&loader);
            let url = url.clone();
            async move {
                let bytes = loader.load_binary(&url, timeout).await?;
                Ok(ImageHandle::new(url, bytes))
            }
            .boxed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use loadstone_core::FetchError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeLoader {
        images: HashMap<String, Bytes>,
        calls: AtomicUsize,
    }

    impl FakeLoader {
        fn new(images: &[(&str, &'static [u8])]) -> Arc<Self> {
            Arc::new(Self {
                images: images
                    .iter()
                    .map(|(url, body)| ((*url).to_string(), Bytes::from_static(body)))
                    .collect(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl BinaryLoader for FakeLoader {
        async fn load_binary(&self, url: &str, _timeout: Duration) -> Result<Bytes, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.images
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::network(format!("failed to fetch {url}")))
        }
    }

    fn fast_config() -> ImageLoaderConfig {
        ImageLoaderConfig {
            capacity: 4,
            attempt_timeout: Duration::from_millis(100),
            fallback_url: None,
            retry: RetryPolicy {
                max_attempts: 1,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
                backoff_multiplier: 2.0,
            },
        }
    }

    #[tokio::test]
    async fn test_image_cached_per_url_without_expiry() {
        let backend = FakeLoader::new(&[("https://img.example/a.png", b"aaa")]);
        let loader = ImageLoader::new(backend.clone(), fast_config());

        let first = loader
            .load_image("https://img.example/a.png", ImageOptions::default())
            .await
            .expect("first load");
        assert!(!first.served_from_cache);
        assert_eq!(first.value.bytes, Bytes::from_static(b"aaa"));

        let second = loader
            .load_image("https://img.example/a.png", ImageOptions::default())
            .await
            .expect("second load");
        assert!(second.served_from_cache);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_image_uses_fallback_url() {
        let backend = FakeLoader::new(&[("https://img.example/placeholder.png", b"ppp")]);
        let loader = ImageLoader::new(backend.clone(), fast_config());

        let result = loader
            .load_image(
                "https://img.example/broken.png",
                ImageOptions::with_fallback("https://img.example/placeholder.png"),
            )
            .await
            .expect("fallback load");

        assert_eq!(result.value.url, "https://img.example/placeholder.png");
        assert_eq!(result.value.bytes, Bytes::from_static(b"ppp"));
        // 2 attempts against the broken URL, 1 against the placeholder
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_configured_fallback_applies_by_default() {
        let backend = FakeLoader::new(&[("https://img.example/placeholder.png", b"ppp")]);
        let mut config = fast_config();
        config.fallback_url = Some("https://img.example/placeholder.png".to_string());
        let loader = ImageLoader::new(backend, config);

        let result = loader
            .load_image("https://img.example/broken.png", ImageOptions::default())
            .await
            .expect("configured fallback");
        assert_eq!(result.value.url, "https://img.example/placeholder.png");
    }

    #[tokio::test]
    async fn test_fallback_equal_to_primary_is_skipped() {
        let backend = FakeLoader::new(&[]);
        let loader = ImageLoader::new(backend.clone(), fast_config());

        let result = loader
            .load_image(
                "https://img.example/broken.png",
                ImageOptions::with_fallback("https://img.example/broken.png"),
            )
            .await;

        assert!(result.is_err());
        // Only the primary's 2 attempts, no fallback pass
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_capacity_bound_on_image_cache() {
        let backend = FakeLoader::new(&[
            ("https://img.example/1.png", b"1"),
            ("https://img.example/2.png", b"2"),
            ("https://img.example/3.png", b"3"),
            ("https://img.example/4.png", b"4"),
            ("https://img.example/5.png", b"5"),
        ]);
        let loader = ImageLoader::new(backend, fast_config());

        for i in 1..=5 {
            loader
                .load_image(&format!("https://img.example/{i}.png"), ImageOptions::default())
                .await
                .expect("load");
        }
        assert!(loader.len() <= 4);
    }

    #[tokio::test]
    async fn test_clear_empties_cache() {
        let backend = FakeLoader::new(&[("https://img.example/a.png", b"aaa")]);
        let loader = ImageLoader::new(backend, fast_config());

        loader
            .load_image("https://img.example/a.png", ImageOptions::default())
            .await
            .expect("load");
        loader.clear();
        assert!(loader.is_empty());
    }
}
