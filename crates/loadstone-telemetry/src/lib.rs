//! # Loadstone Telemetry
//!
//! Structured logging for the fetch layer: configurable level filtering and
//! JSON/pretty/compact output over `tracing-subscriber`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod logging;

// Re-export main types
pub use logging::{init_logging, LogFormat, LoggingConfig, LoggingError};
