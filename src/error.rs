//! Custom error types for ynab-sensors
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. Every error also maps to a coarse
//! [`ErrorKind`] that the poll status and the sensors report.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The main error type for ynab-sensors operations
#[derive(Error, Debug)]
pub enum YnabError {
    /// The access token was rejected (401/403)
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Transport-level failure (DNS, TLS, connection reset)
    #[error("Network error: {0}")]
    Network(String),

    /// A refresh or request took longer than the configured bound
    #[error("Timed out after {0}s")]
    Timeout(u64),

    /// YNAB reported a server-side outage (5xx)
    #[error("YNAB service unavailable ({status}): {message}")]
    ServiceUnavailable { status: u16, message: String },

    /// Too many requests for this token (429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Any other non-success HTTP status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Malformed or unexpected API payloads
    #[error("Data error: {0}")]
    Data(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The settings file could not be brought to the current schema
    #[error("Config migration error: {0}")]
    ConfigMigration(String),

    /// Validation errors for user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Coarse classification of a failure, as surfaced in poll status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Invalid or revoked credential
    Auth,
    /// Network failure, timeout or server outage; retried on the next tick
    Connect,
    /// Request budget exhausted; retried on the next tick
    RateLimited,
    /// Malformed or missing data, including a missing budget
    Data,
    /// Local configuration problem
    Config,
    /// Settings schema could not be migrated
    ConfigMigration,
    /// Local I/O or serialization failure
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Auth => "auth",
            Self::Connect => "connect",
            Self::RateLimited => "rate_limited",
            Self::Data => "data",
            Self::Config => "config",
            Self::ConfigMigration => "config_migration",
            Self::Internal => "internal",
        };
        write!(f, "{}", label)
    }
}

impl YnabError {
    /// Create a "not found" error for budgets
    pub fn budget_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget",
            identifier: identifier.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth(_) => ErrorKind::Auth,
            Self::Network(_) | Self::Timeout(_) | Self::ServiceUnavailable { .. } => {
                ErrorKind::Connect
            }
            Self::RateLimited(_) => ErrorKind::RateLimited,
            Self::Api { .. } | Self::NotFound { .. } | Self::Data(_) => ErrorKind::Data,
            Self::Config(_) | Self::Validation(_) => ErrorKind::Config,
            Self::ConfigMigration(_) => ErrorKind::ConfigMigration,
            Self::Io(_) | Self::Json(_) | Self::Storage(_) => ErrorKind::Internal,
        }
    }

    /// Check if this is an authentication error
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for YnabError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for YnabError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<reqwest::Error> for YnabError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network(format!("request timed out: {}", err))
        } else if err.is_decode() {
            Self::Data(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Result type alias for ynab-sensors operations
pub type YnabResult<T> = Result<T, YnabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = YnabError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = YnabError::budget_not_found("abc");
        assert_eq!(err.to_string(), "Budget not found: abc");
        assert!(err.is_not_found());
        assert_eq!(err.kind(), ErrorKind::Data);
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(YnabError::Auth("bad".into()).kind(), ErrorKind::Auth);
        assert_eq!(YnabError::Timeout(30).kind(), ErrorKind::Connect);
        assert_eq!(
            YnabError::ServiceUnavailable {
                status: 503,
                message: "down".into()
            }
            .kind(),
            ErrorKind::Connect
        );
        assert_eq!(
            YnabError::RateLimited("429".into()).kind(),
            ErrorKind::RateLimited
        );
        assert_eq!(
            YnabError::ConfigMigration("v9".into()).kind(),
            ErrorKind::ConfigMigration
        );
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(YnabError::Timeout(30).to_string(), "Timed out after 30s");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: YnabError = io_err.into();
        assert!(matches!(err, YnabError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
