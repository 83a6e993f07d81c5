//! Types for sending template messages.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Body of a `send-template` request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SendTemplateRequest {
    /// Normalized recipient phone number (digits only).
    pub phone_number: String,

    /// Template name from the catalog.
    pub template_name: String,

    /// Positional template parameters. Sendouts always leave this empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub template_params: Vec<String>,
}

impl SendTemplateRequest {
    /// Create a zero-parameter template send.
    pub fn new(phone_number: impl Into<String>, template_name: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            template_name: template_name.into(),
            template_params: Vec::new(),
        }
    }
}

/// Result of a successful `send-template` call.
///
/// Field types are decoded leniently: ids may arrive as numbers, and a
/// missing or non-boolean `success` reads as `false`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SendTemplateResponse {
    /// Delivery status reported by the service (e.g. "sent").
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,

    /// Internal message id.
    #[serde(default, deserialize_with = "lenient_string")]
    pub message_id: Option<String>,

    /// Provider-side message id.
    #[serde(default, deserialize_with = "lenient_string")]
    pub external_message_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_bool")]
    pub success: bool,
}

impl SendTemplateResponse {
    /// Decode the body of a 2xx send.
    ///
    /// The message was accepted, so an unexpected body never becomes an
    /// error; it yields an empty response instead.
    pub fn from_body(body: Value) -> Self {
        match serde_json::from_value(body) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Unexpected send-template response body");
                Self::default()
            }
        }
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}
