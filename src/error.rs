//! Error types for the nikah-match library.
//!
//! This module provides custom error types using `thiserror`. Store failures
//! are surfaced as errors; no substitute data is ever returned.

use thiserror::Error;

/// Errors that can occur while scoring, ranking or recording interactions.
#[derive(Error, Debug)]
pub enum MatchError {
    /// Requester or counterpart identity absent from the profile store
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Transient persistence failure; the caller may retry with backoff
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Malformed input such as an inverted age range
    #[error("Validation error: {0}")]
    Validation(String),

    /// A store round-trip exceeded the configured bound.
    ///
    /// Only the wait is abandoned. Blocking store work that already started
    /// keeps running, so a timed-out write may still commit afterwards.
    #[error("Operation '{operation}' timed out after {timeout_ms} ms")]
    Timeout {
        /// Store operation that was cut off
        operation: &'static str,
        /// Configured bound in milliseconds
        timeout_ms: u64,
    },

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

impl MatchError {
    /// True for failures where retrying the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::Timeout { .. })
    }

    /// Short label used for metrics and structured logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ProfileNotFound(_) => "profile_not_found",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Validation(_) => "validation",
            Self::Timeout { .. } => "timeout",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for Result with `MatchError`
pub type Result<T> = std::result::Result<T, MatchError>;

impl From<anyhow::Error> for MatchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<rusqlite::Error> for MatchError {
    fn from(err: rusqlite::Error) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

impl From<r2d2::Error> for MatchError {
    fn from(err: r2d2::Error) -> Self {
        Self::StoreUnavailable(format!("connection pool: {err}"))
    }
}

impl From<tokio::task::JoinError> for MatchError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::StoreUnavailable(format!("blocking store task failed: {err}"))
    }
}

impl From<config::ConfigError> for MatchError {
    fn from(err: config::ConfigError) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}
