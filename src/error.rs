// src/error.rs

//! Unified error handling for the harvester.

use std::fmt;

use thiserror::Error;

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
///
/// Per-record storage problems are not represented here; they are reported
/// as [`crate::storage::InsertOutcome`] values and only show up in counts.
#[derive(Error, Debug)]
pub enum AppError {
    /// Storage connection missing or could not be established
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Schema setup or other collection-level storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// The listing kept answering 429 until the retry budget ran out
    #[error("Rate limit not lifted after {attempts} attempts for {url}")]
    RateLimitExhausted { url: String, attempts: u32 },

    /// Any status other than 200 or 429
    #[error("Unexpected status {status} for {url}")]
    UnexpectedStatus { url: String, status: u16 },

    /// Timeout or transport failure while talking to the listing
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    /// Listing page did not have the expected shape
    #[error("Malformed page: {0}")]
    MalformedPage(String),

    /// HTTP client could not be built
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a storage-unavailable error.
    pub fn unavailable(message: impl fmt::Display) -> Self {
        Self::StorageUnavailable(message.to_string())
    }

    /// Create a storage error.
    pub fn storage(message: impl fmt::Display) -> Self {
        Self::Storage(message.to_string())
    }

    /// Create a network error for the given request URL.
    pub fn network(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Network {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a malformed-page error.
    pub fn malformed(message: impl fmt::Display) -> Self {
        Self::MalformedPage(message.to_string())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the error came from the remote listing rather than local setup.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExhausted { .. }
                | Self::UnexpectedStatus { .. }
                | Self::Network { .. }
                | Self::MalformedPage(_)
        )
    }
}
