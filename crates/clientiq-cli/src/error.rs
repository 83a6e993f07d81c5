//! CLI error type.

use crm_api::CrmError;
use sendout::SendoutError;
use thiserror::Error;
use whatsapp_api::ApiError;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Not logged in. Run `clientiq login` first")]
    NotLoggedIn,

    #[error("Session expired. Run `clientiq login` again")]
    SessionExpired,

    #[error(transparent)]
    Crm(#[from] CrmError),

    #[error(transparent)]
    Messaging(#[from] ApiError),

    #[error(transparent)]
    Sendout(#[from] SendoutError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Whether the stored token was rejected by either API.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            CliError::Crm(CrmError::Unauthorized) | CliError::Messaging(ApiError::Unauthorized)
        )
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
