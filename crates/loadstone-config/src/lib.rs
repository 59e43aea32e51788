//! # Loadstone Configuration
//!
//! Configuration management for the fetch layer:
//! - Schema with validation and defaults
//! - Loading from YAML/TOML/JSON files
//! - `${VAR}` / `${VAR:-default}` environment substitution
//! - `LOADSTONE_*` environment overrides

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod loader;
pub mod schema;

// Re-export main types
pub use loader::{load_config, ConfigError, ConfigLoader, ConfigSource};
pub use schema::{
    AppConfig, ImagesConfig, ObservabilityConfig, RecordsConfig, RetryConfig, SourcesConfig,
};
