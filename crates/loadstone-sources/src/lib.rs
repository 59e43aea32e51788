//! # Loadstone Sources
//!
//! Collaborator implementations consumed by the fetch layer:
//! - HTTP-backed record store and binary loader over reqwest
//! - Canned demo record store for offline use and tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod demo;
pub mod http;

// Re-export main types
pub use demo::DemoRecordStore;
pub use http::{HttpBinaryLoader, HttpRecordStore};
