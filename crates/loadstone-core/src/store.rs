//! Collaborator traits consumed by the fetch layer.
//!
//! Implementations live outside the core (HTTP-backed, demo dataset, test
//! doubles). Every method fails with a [`FetchError`] tagged at the point of
//! failure, so the fetch layer never has to recover intent from raw errors.

use crate::error::FetchError;
use crate::types::{RecordDetail, RecordList};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Remote store of project records
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Load the full record list
    ///
    /// # Errors
    /// Returns `FetchError` on transport or storage failure
    async fn load_list(&self) -> Result<RecordList, FetchError>;

    /// Load one record's detail by id
    ///
    /// # Errors
    /// Returns `FetchError` on transport or storage failure, or
    /// `FetchError::Validation` for a malformed id
    async fn load_detail(&self, id: &str) -> Result<RecordDetail, FetchError>;
}

/// Loader for binary image resources
#[async_trait]
pub trait BinaryLoader: Send + Sync + 'static {
    /// Load the resource at `url`, bounding the attempt to `timeout`.
    ///
    /// The timeout applies per individual attempt; a hung attempt is cut off
    /// and reported as a `Network`-kind failure eligible for retry.
    ///
    /// # Errors
    /// Returns `FetchError::Network` on timeout or transport failure
    async fn load_binary(&self, url: &str, timeout: Duration) -> Result<Bytes, FetchError>;
}
