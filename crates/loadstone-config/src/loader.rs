//! Configuration loading from files and environment.
//!
//! Supports YAML, TOML, and JSON sources with `${VAR}` and
//! `${VAR:-default}` environment substitution, plus `LOADSTONE_*` overrides
//! for the knobs most commonly flipped in deployment.

use crate::schema::AppConfig;
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File not found
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// The path to the file that was not found
        path: String,
    },

    /// IO error
    #[error("IO error reading configuration: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error
    #[error("Configuration validation error: {0}")]
    Validation(String),

    /// Unsupported format
    #[error("Unsupported configuration format: {extension}")]
    UnsupportedFormat {
        /// The file extension that was not supported
        extension: String,
    },
}

/// Configuration source
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// File path
    File(String),
    /// Raw YAML string
    Yaml(String),
    /// Raw TOML string
    Toml(String),
    /// Raw JSON string
    Json(String),
    /// Default configuration
    Default,
}

/// Configuration loader
pub struct ConfigLoader {
    sources: Vec<ConfigSource>,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Create a new config loader
    #[must_use]
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            env_prefix: None,
        }
    }

    /// Add a configuration source
    #[must_use]
    pub fn with_source(mut self, source: ConfigSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Add a file source
    #[must_use]
    pub fn with_file(self, path: impl Into<String>) -> Self {
        self.with_source(ConfigSource::File(path.into()))
    }

    /// Set environment variable prefix for overrides
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Load configuration.
    ///
    /// Each source yields a complete document (unset sections fall back to
    /// defaults); when several sources are given, the last one wins
    /// wholesale. Environment overrides are applied after the winning
    /// source.
    ///
    /// # Errors
    /// Returns error if any source fails to load or the final configuration
    /// fails validation
    pub async fn load(self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        for source in self.sources {
            config = Self::load_source(&source).await?;
        }

        if let Some(ref prefix) = self.env_prefix {
            config = Self::apply_env_overrides(config, prefix);
        }

        config
            .validate_config()
            .map_err(|e| ConfigError::Validation(format!("{e:?}")))?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    async fn load_source(source: &ConfigSource) -> Result<AppConfig, ConfigError> {
        match source {
            ConfigSource::File(path) => Self::load_file(path).await,
            ConfigSource::Yaml(content) => Self::parse_yaml(content),
            ConfigSource::Toml(content) => Self::parse_toml(content),
            ConfigSource::Json(content) => Self::parse_json(content),
            ConfigSource::Default => Ok(AppConfig::default()),
        }
    }

    async fn load_file(path: &str) -> Result<AppConfig, ConfigError> {
        let path = Path::new(path);

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = fs::read_to_string(path).await?;
        let content = Self::substitute_env_vars(&content);

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        debug!("Loading configuration from {} (format: {})", path.display(), extension);

        match extension.as_str() {
            "yaml" | "yml" => Self::parse_yaml(&content),
            "toml" => Self::parse_toml(&content),
            "json" => Self::parse_json(&content),
            ext => Err(ConfigError::UnsupportedFormat {
                extension: ext.to_string(),
            }),
        }
    }

    fn parse_yaml(content: &str) -> Result<AppConfig, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    fn parse_toml(content: &str) -> Result<AppConfig, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn parse_json(content: &str) -> Result<AppConfig, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Substitute environment variables in content.
    ///
    /// Supports `${VAR}` and `${VAR:-default}` syntax. Missing variables
    /// without a default are left in place with a warning — they might be
    /// optional.
    ///
    /// # Panics
    /// Panics if the regex is invalid (cannot happen with a static pattern)
    #[allow(clippy::expect_used)]
    fn substitute_env_vars(content: &str) -> String {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("valid regex");
        let mut result = content.to_string();

        for cap in re.captures_iter(content) {
            let full_match = cap.get(0).expect("match exists").as_str();
            let var_spec = cap.get(1).expect("group exists").as_str();

            let (var_name, default) = if let Some(idx) = var_spec.find(":-") {
                (&var_spec[..idx], Some(&var_spec[idx + 2..]))
            } else {
                (var_spec, None)
            };

            match std::env::var(var_name) {
                Ok(value) => {
                    result = result.replace(full_match, &value);
                }
                Err(_) => {
                    if let Some(default_val) = default {
                        result = result.replace(full_match, default_val);
                    } else {
                        warn!("Environment variable not found: {}", var_name);
                    }
                }
            }
        }

        result
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: AppConfig, prefix: &str) -> AppConfig {
        if let Ok(endpoint) = std::env::var(format!("{prefix}_SOURCES_ENDPOINT")) {
            config.sources.endpoint = endpoint;
        }

        if let Ok(api_key) = std::env::var(format!("{prefix}_API_KEY")) {
            config.sources.api_key = Some(api_key);
        }

        if let Ok(demo) = std::env::var(format!("{prefix}_DEMO_MODE")) {
            config.sources.demo_mode = demo.parse().unwrap_or(false);
        }

        if let Ok(level) = std::env::var(format!("{prefix}_LOG_LEVEL")) {
            config.observability.logging.level = level;
        }

        config
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Load configuration from default locations.
///
/// Looks for configuration in order:
/// 1. Path from `LOADSTONE_CONFIG` environment variable
/// 2. ./loadstone.yaml
/// 3. ./config/loadstone.yaml
///
/// Falls back to defaults when no file is found.
///
/// # Errors
/// Returns error if a found file fails to load or validate
pub async fn load_config() -> Result<AppConfig, ConfigError> {
    let config_path = std::env::var("LOADSTONE_CONFIG").ok();

    let search_paths = if let Some(ref path) = config_path {
        vec![path.as_str()]
    } else {
        vec!["loadstone.yaml", "loadstone.yml", "config/loadstone.yaml"]
    };

    for path in &search_paths {
        if Path::new(path).exists() {
            info!("Loading configuration from: {}", path);
            return ConfigLoader::new()
                .with_file(*path)
                .with_env_prefix("LOADSTONE")
                .load()
                .await;
        }
    }

    warn!("No configuration file found, using defaults");
    Ok(AppConfig::default())
}
