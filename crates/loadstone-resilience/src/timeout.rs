//! Per-attempt timeout helpers.
//!
//! Timeouts are applied by the underlying loader, never by the retry
//! executor, so a hung attempt is bounded in duration and then classified as
//! a `Network`-kind failure eligible for retry.

use loadstone_core::FetchError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Execute an operation, bounding it to `timeout`.
///
/// # Errors
/// Returns `FetchError::Network` if the operation does not settle in time
pub async fn with_timeout<F, T>(timeout: Duration, future: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    if let Ok(result) = tokio::time::timeout(timeout, future).await {
        result
    } else {
        warn!(timeout_ms = timeout.as_millis(), "Attempt timed out");
        Err(FetchError::network(format!(
            "operation timed out after {timeout:?}"
        )))
    }
}

/// Extension trait for adding a timeout to any future
#[allow(async_fn_in_trait)]
pub trait TimeoutExt: Sized {
    /// Add a timeout to this future
    ///
    /// # Errors
    /// Returns `FetchError::Network` if the future does not settle in time
    async fn with_timeout(self, timeout: Duration) -> Result<Self::Output, FetchError>
    where
        Self: Future;
}

impl<F: Future> TimeoutExt for F {
    async fn with_timeout(self, timeout: Duration) -> Result<F::Output, FetchError> {
        match tokio::time::timeout(timeout, self).await {
            Ok(result) => Ok(result),
            Err(_) => Err(FetchError::network(format!(
                "operation timed out after {timeout:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadstone_core::ErrorKind;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_timeout_success() {
        let result = with_timeout(Duration::from_secs(1), async {
            sleep(Duration::from_millis(10)).await;
            Ok::<_, FetchError>(42)
        })
        .await;

        assert_eq!(result.expect("completes in time"), 42);
    }

    #[tokio::test]
    async fn test_timeout_exceeded_is_network_kind() {
        let result: Result<u32, _> = with_timeout(Duration::from_millis(20), async {
            sleep(Duration::from_secs(10)).await;
            Ok(42)
        })
        .await;

        let err = result.expect_err("should time out");
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_timeout_ext() {
        let result = async { 42 }.with_timeout(Duration::from_secs(1)).await;
        assert_eq!(result.expect("completes"), 42);

        let result = sleep(Duration::from_secs(10))
            .with_timeout(Duration::from_millis(20))
            .await;
        assert!(result.is_err());
    }
}
