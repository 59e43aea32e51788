//! Configuration schema definitions.
//!
//! All sections default sensibly, so a missing file or sparse document still
//! yields a usable configuration. Durations use humantime strings ("5m",
//! "300ms").

use loadstone_resilience::RetryPolicy;
use loadstone_telemetry::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// Collaborator endpoints
    #[validate(nested)]
    pub sources: SourcesConfig,

    /// Record cache tuning
    #[validate(nested)]
    pub records: RecordsConfig,

    /// Image loader tuning
    #[validate(nested)]
    pub images: ImagesConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Validate the configuration
    ///
    /// # Errors
    /// Returns validation errors if the configuration is invalid
    pub fn validate_config(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()
    }
}

/// Collaborator endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SourcesConfig {
    /// Base URL of the record store
    #[validate(url)]
    pub endpoint: String,

    /// API key (can be an env var reference like ${LOADSTONE_API_KEY})
    pub api_key: Option<String>,

    /// Serve the canned demo dataset instead of the remote store
    pub demo_mode: bool,

    /// Request timeout for record store calls
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            api_key: None,
            demo_mode: false,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Record cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RecordsConfig {
    /// Freshness window of the list slot
    #[serde(with = "humantime_serde")]
    pub list_ttl: Duration,

    /// Freshness window of detail entries
    #[serde(with = "humantime_serde")]
    pub detail_ttl: Duration,

    /// Maximum number of cached details
    #[validate(range(min = 1))]
    pub detail_capacity: usize,

    /// Retry policy for record loads
    #[validate(nested)]
    pub retry: RetryConfig,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            list_ttl: Duration::from_secs(5 * 60),
            detail_ttl: Duration::from_secs(10 * 60),
            detail_capacity: 64,
            retry: RetryConfig::default(),
        }
    }
}

/// Image loader configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ImagesConfig {
    /// Maximum number of cached images
    #[validate(range(min = 1))]
    pub capacity: usize,

    /// Time box for each individual load attempt
    #[serde(with = "humantime_serde")]
    pub attempt_timeout: Duration,

    /// Default fallback URL substituted when a load fails outright
    #[validate(url)]
    pub fallback_url: Option<String>,

    /// Retry policy for image loads
    #[validate(nested)]
    pub retry: RetryConfig,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            capacity: 128,
            attempt_timeout: Duration::from_secs(10),
            fallback_url: None,
            retry: RetryConfig {
                max_attempts: 2,
                base_delay: Duration::from_millis(300),
                max_delay: Duration::from_secs(5),
                backoff_multiplier: 2.0,
            },
        }
    }
}

/// Retry policy configuration.
///
/// `max_attempts` counts *retries* on top of the initial try.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt
    pub max_attempts: u32,

    /// Delay before the first retry
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,

    /// Ceiling on the computed delay
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,

    /// Multiplier applied to the delay per failed attempt
    #[validate(range(min = 1.0))]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Convert into the resilience layer's policy value
    #[must_use]
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: self.base_delay,
            max_delay: self.max_delay,
            backoff_multiplier: self.backoff_multiplier,
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
}
