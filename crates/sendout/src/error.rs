//! Error types for sendout.

use thiserror::Error;

use crate::recipients::RecipientError;

/// Errors that prevent a sendout from starting.
///
/// Per-recipient send failures are not errors at this level; they end up
/// as `failed` records in the sendout report.
#[derive(Debug, Error)]
pub enum SendoutError {
    #[error("No recipients to send to")]
    NoRecipients,

    #[error("No template selected")]
    NoTemplate,

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Recipient input error: {0}")]
    Recipients(#[from] RecipientError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
