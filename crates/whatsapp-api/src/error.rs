//! Error types for whatsapp-api.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to the messaging API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The access token was rejected (HTTP 401).
    #[error("Unauthorized: access token missing or expired")]
    Unauthorized,

    /// Non-success response from the API.
    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        /// Server-provided `Retry-After` hint.
        retry_after: Option<Duration>,
        message: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status code, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Unauthorized => Some(401),
            _ => None,
        }
    }

    /// Server-provided retry hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ApiError::Status { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// True for rate limiting (429), server errors (5xx) and network failures.
    pub fn is_throttling(&self) -> bool {
        match self {
            ApiError::Http(_) => true,
            ApiError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}
