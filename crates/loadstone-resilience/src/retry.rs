//! Retry with jittered exponential backoff.
//!
//! A policy permits `max_attempts` *retries* on top of the initial try, so
//! an operation runs at most `max_attempts + 1` times. Non-retryable
//! failures short-circuit, and the terminal error is always the last
//! attempt's error.

use loadstone_core::FetchError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound of the additive jitter added to every backoff delay
const JITTER_MAX: Duration = Duration::from_millis(1000);

/// Retry policy for a single call site.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Ceiling on the computed (pre-jitter) delay
    pub max_delay: Duration,
    /// Multiplier applied to the delay per failed attempt
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the default backoff shape
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Policy that never retries
    #[must_use]
    pub fn no_retries() -> Self {
        Self::new(0)
    }

    /// Total number of times the operation may run (initial try + retries)
    #[must_use]
    pub fn total_attempts(&self) -> u32 {
        self.max_attempts + 1
    }

    /// Pre-jitter delay after failed attempt `attempt` (1-based).
    ///
    /// `base_delay * backoff_multiplier^(attempt - 1)`, capped at
    /// `max_delay`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let scaled = self.base_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent as i32);
        Duration::from_secs_f64(scaled).min(self.max_delay)
    }
}

/// Run `operation`, retrying retryable failures per `policy`.
///
/// Jitter is additive and drawn independently per attempt, so concurrently
/// failing callers do not synchronize into retry storms.
///
/// # Errors
/// Returns the last attempt's error once retries are exhausted, or the
/// first non-retryable error immediately.
pub async fn run_with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let total = policy.total_attempts();

    for attempt in 1..=total {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if !err.is_retryable() => {
                debug!(kind = ?err.kind(), "Non-retryable failure, not retrying");
                return Err(err);
            }
            Err(err) if attempt == total => {
                warn!(attempt, kind = ?err.kind(), "Retries exhausted");
                return Err(err);
            }
            Err(err) => {
                let delay = policy.delay_for_attempt(attempt);
                let jitter =
                    Duration::from_millis(rand::thread_rng().gen_range(0..JITTER_MAX.as_millis() as u64));
                warn!(
                    attempt,
                    kind = ?err.kind(),
                    delay_ms = (delay + jitter).as_millis(),
                    "Attempt failed, backing off"
                );
                tokio::time::sleep(delay + jitter).await;
            }
        }
    }

    unreachable!("retry loop always returns within total_attempts iterations")
}
