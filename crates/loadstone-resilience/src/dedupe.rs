//! In-flight deduplication of concurrent loads.
//!
//! At most one execution of the producer runs per key at a time; concurrent
//! callers for the same key join the existing load and observe the same
//! settlement, success or failure.

use futures::future::{BoxFuture, FutureExt, Shared};
use loadstone_core::FetchError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

type SharedLoad<T> = Shared<BoxFuture<'static, Result<T, FetchError>>>;

/// Registry of pending loads, keyed by resource key.
///
/// The check-then-insert sequence is guarded by a mutex that is never held
/// across an await, so the registry is safe under a multi-threaded runtime.
#[derive(Clone)]
pub struct InFlight<T> {
    pending: Arc<Mutex<HashMap<String, SharedLoad<T>>>>,
}

impl<T> std::fmt::Debug for InFlight<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlight")
            .field("pending", &self.pending.lock().len())
            .finish()
    }
}

impl<T> Default for InFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InFlight<T> {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of loads currently in flight
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether no loads are in flight
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

impl<T: Clone + Send + Sync + 'static> InFlight<T> {
    /// Run `producer` for `key`, or join the load already in flight.
    ///
    /// The leader runs on its own task, so it drives to completion even when
    /// every caller drops its join mid-flight. It removes its own key from
    /// the registry upon settlement, before any caller resumes. A caller
    /// that immediately retries after a failure therefore starts a fresh
    /// load instead of re-joining the completed one — this holds for
    /// failures as much as successes, so a permanently failing key never
    /// wedges future callers.
    ///
    /// # Errors
    /// Propagates the producer's error to every joined caller.
    pub async fn run<F, Fut>(&self, key: &str, producer: F) -> Result<T, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let shared = {
            let mut pending = self.pending.lock();

            if let Some(existing) = pending.get(key) {
                debug!(key, "Joining in-flight load");
                existing.clone()
            } else {
                let registry = Arc::clone(&self.pending);
                let owned_key = key.to_string();
                let load = producer();

                let leader = tokio::spawn(async move {
                    let result = load.await;
                    // Unconditional cleanup, ordered before any joiner resumes
                    registry.lock().remove(&owned_key);
                    result
                });

                let shared: SharedLoad<T> = async move {
                    leader.await.unwrap_or_else(|e| {
                        Err(FetchError::unknown(format!("load task failed: {e}")))
                    })
                }
                .boxed()
                .shared();

                pending.insert(key.to_string(), shared.clone());
                shared
            }
        };

        shared.await
    }
}
