//! The uniform result envelope returned to every caller of the fetch layer.

use crate::error::FetchError;
use std::time::Duration;

/// Result type alias for fetch operations.
///
/// Cache hits, fresh loads, successful retries, and fallback substitutions
/// all produce the same shape; only [`Fetched::served_from_cache`] and
/// [`Fetched::elapsed`] differ, so callers can instrument without branching.
pub type FetchResult<T> = Result<Fetched<T>, FetchError>;

/// A successfully fetched value with provenance metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<T> {
    /// The fetched value
    pub value: T,
    /// Whether the value came from the cache rather than a fresh load
    pub served_from_cache: bool,
    /// Wall-clock time spent inside the fetch call
    pub elapsed: Duration,
}

impl<T> Fetched<T> {
    /// Wrap a value served from the cache
    #[must_use]
    pub fn cached(value: T, elapsed: Duration) -> Self {
        Self {
            value,
            served_from_cache: true,
            elapsed,
        }
    }

    /// Wrap a freshly loaded value
    #[must_use]
    pub fn loaded(value: T, elapsed: Duration) -> Self {
        Self {
            value,
            served_from_cache: false,
            elapsed,
        }
    }

    /// Discard the provenance metadata and take the value
    pub fn into_value(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provenance_flags() {
        let hit = Fetched::cached(1, Duration::from_micros(5));
        assert!(hit.served_from_cache);

        let load = Fetched::loaded(1, Duration::from_millis(40));
        assert!(!load.served_from_cache);
        assert_eq!(load.into_value(), 1);
    }
}
