//! Error types for network operations

use thiserror::Error;

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors that can occur while talking to the remote API
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Transport-level failure (includes request timeouts)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// No connectivity to any probe target
    #[error("Network unavailable")]
    NetworkUnavailable,

    /// The configured base URL is not usable
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl NetworkError {
    /// Returns true for transient failures that should flip the caller
    /// into offline handling instead of being surfaced as faults
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::NetworkUnavailable => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
