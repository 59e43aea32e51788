//! # Loadstone Cache
//!
//! The resilient resource cache: one fetch operation composing TTL caching,
//! in-flight deduplication, bounded retry, and one-level fallback
//! substitution, plus the two call-site adapters built on it:
//! - `RecordCache` for structured project records (list + detail)
//! - `ImageLoader` for binary image resources

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod images;
pub mod records;
pub mod resource_cache;

// Re-export main types
pub use images::{ImageLoader, ImageLoaderConfig, ImageOptions};
pub use records::{RecordCache, RecordCacheConfig};
pub use resource_cache::{FallbackSource, FetchOptions, ResourceCache, ResourceCacheConfig};
