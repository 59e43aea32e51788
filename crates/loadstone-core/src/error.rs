//! Error taxonomy for the fetch layer.
//!
//! Collaborators tag failures at the point of failure, so retryability is
//! carried by the variant rather than recovered from message text. A
//! substring classifier remains as a last resort for errors originating
//! outside the fetch layer's control.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure taxonomy for resource fetches.
///
/// Every failure that crosses the fetch layer's public boundary is one of
/// these variants. The variants are `Clone` because deduplicated callers all
/// observe the same terminal failure.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Transport or connectivity failure, including per-attempt timeouts
    #[error("Network error: {message}")]
    Network {
        /// Error message
        message: String,
    },

    /// Remote object-store failure
    #[error("Storage error: {message}")]
    Storage {
        /// Error message
        message: String,
    },

    /// Upstream content-generation service failure
    #[error("Generation error: {message}")]
    RemoteGeneration {
        /// Error message
        message: String,
    },

    /// Caller supplied a malformed request; never retried
    #[error("Validation error: {message}")]
    Validation {
        /// Error message
        message: String,
        /// Field that failed validation (if applicable)
        field: Option<String>,
    },

    /// Unclassified failure
    #[error("Unknown error: {message}")]
    Unknown {
        /// Error message
        message: String,
    },
}

/// Error kind, decoupled from the message payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transport or connectivity failure
    Network,
    /// Remote object-store failure
    Storage,
    /// Upstream content-generation service failure
    RemoteGeneration,
    /// Malformed request
    Validation,
    /// Unclassified failure
    Unknown,
}

impl ErrorKind {
    /// Whether failures of this kind are eligible for retry.
    ///
    /// Retryability is a fixed property of the kind, never independently
    /// settable, so retry policy stays centralized and auditable.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Storage | Self::RemoteGeneration)
    }
}

impl FetchError {
    /// Get the kind of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::RemoteGeneration { .. } => ErrorKind::RemoteGeneration,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Get the error message without the kind prefix
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Network { message }
            | Self::Storage { message }
            | Self::RemoteGeneration { message }
            | Self::Validation { message, .. }
            | Self::Unknown { message } => message,
        }
    }

    /// Create a network error
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a storage error
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a remote-generation error
    #[must_use]
    pub fn remote_generation(message: impl Into<String>) -> Self {
        Self::RemoteGeneration {
            message: message.into(),
        }
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(message: impl Into<String>, field: Option<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field,
        }
    }

    /// Create an unknown error
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Classify a foreign error by message inspection.
    ///
    /// Last-resort fallback for errors that were not tagged at the point of
    /// failure. Matching is by substring, in priority order: network-like
    /// wording first, then generation-service wording, then `Unknown`.
    /// Pure and side-effect-free, so it is safe to call speculatively.
    #[must_use]
    pub fn classify(err: &(dyn std::error::Error + 'static)) -> Self {
        Self::classify_message(&err.to_string())
    }

    /// Classify a raw failure message. See [`FetchError::classify`].
    #[must_use]
    pub fn classify_message(message: &str) -> Self {
        let lower = message.to_lowercase();

        if ["network", "fetch", "timeout", "timed out", "connection"]
            .iter()
            .any(|needle| lower.contains(needle))
        {
            return Self::network(message);
        }

        if ["quota", "api key", "safety"]
            .iter()
            .any(|needle| lower.contains(needle))
        {
            return Self::remote_generation(message);
        }

        Self::unknown(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability_by_kind() {
        assert!(FetchError::network("down").is_retryable());
        assert!(FetchError::storage("bucket gone").is_retryable());
        assert!(FetchError::remote_generation("model overloaded").is_retryable());
        assert!(!FetchError::validation("bad id", Some("id".to_string())).is_retryable());
        assert!(!FetchError::unknown("?").is_retryable());
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(FetchError::network("x").kind(), ErrorKind::Network);
        assert_eq!(FetchError::storage("x").kind(), ErrorKind::Storage);
        assert_eq!(
            FetchError::remote_generation("x").kind(),
            ErrorKind::RemoteGeneration
        );
        assert_eq!(FetchError::validation("x", None).kind(), ErrorKind::Validation);
        assert_eq!(FetchError::unknown("x").kind(), ErrorKind::Unknown);
    }

    #[test]
    fn test_classify_network_wording() {
        assert_eq!(
            FetchError::classify_message("Failed to fetch resource").kind(),
            ErrorKind::Network
        );
        assert_eq!(
            FetchError::classify_message("request timed out after 10s").kind(),
            ErrorKind::Network
        );
        assert_eq!(
            FetchError::classify_message("Connection reset by peer").kind(),
            ErrorKind::Network
        );
    }

    #[test]
    fn test_classify_generation_wording() {
        assert_eq!(
            FetchError::classify_message("quota exceeded for project").kind(),
            ErrorKind::RemoteGeneration
        );
        assert_eq!(
            FetchError::classify_message("invalid API key").kind(),
            ErrorKind::RemoteGeneration
        );
        assert_eq!(
            FetchError::classify_message("blocked by safety filter").kind(),
            ErrorKind::RemoteGeneration
        );
    }

    #[test]
    fn test_classify_priority_and_fallthrough() {
        // Network wording wins over generation wording
        assert_eq!(
            FetchError::classify_message("network error while checking quota").kind(),
            ErrorKind::Network
        );
        assert_eq!(
            FetchError::classify_message("something odd happened").kind(),
            ErrorKind::Unknown
        );
    }

    #[test]
    fn test_message_preserved() {
        let err = FetchError::classify_message("Connection refused");
        assert_eq!(err.message(), "Connection refused");
    }
}
