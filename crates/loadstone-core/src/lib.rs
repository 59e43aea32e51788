//! # Loadstone Core
//!
//! Shared types for the loadstone resource-fetch layer:
//! - `FetchError`: closed error taxonomy with per-kind retryability
//! - `Fetched` / `FetchResult`: the uniform envelope returned to callers
//! - Record and image domain types
//! - Collaborator traits for the record store and binary loader

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod result;
pub mod store;
pub mod types;

// Re-export main types
pub use error::{ErrorKind, FetchError};
pub use result::{FetchResult, Fetched};
pub use store::{BinaryLoader, RecordStore};
pub use types::{ImageHandle, MaterialItem, RecordDetail, RecordList, RecordSummary, Step};
