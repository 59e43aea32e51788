//! # Loadstone Resilience
//!
//! Resilience primitives for the resource-fetch layer:
//! - Retry with jittered exponential backoff
//! - In-flight deduplication of concurrent loads
//! - Bounded TTL cache with insertion-order eviction
//! - Per-attempt timeout helpers

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dedupe;
pub mod retry;
pub mod timeout;
pub mod ttl_cache;

// Re-export main types
pub use dedupe::InFlight;
pub use retry::{run_with_retry, RetryPolicy};
pub use timeout::{with_timeout, TimeoutExt};
pub use ttl_cache::{CacheStats, TtlCache};
