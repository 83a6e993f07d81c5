//! Error types for crm-api.

use thiserror::Error;

/// Errors that can occur when talking to the dashboard API.
#[derive(Debug, Error)]
pub enum CrmError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Token store could not be read or written.
    #[error("Token store error: {0}")]
    Io(#[from] std::io::Error),

    /// The access token was rejected; log in again.
    #[error("Unauthorized: please log in again")]
    Unauthorized,

    /// Wrong username or password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Login failed for a reason other than bad credentials.
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// Non-success response from a dashboard endpoint.
    #[error("{api} API {status}")]
    Status { api: &'static str, status: u16 },

    /// Invalid configuration or arguments.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for dashboard API operations.
pub type Result<T> = std::result::Result<T, CrmError>;
