//! Message statistics and history types.

use serde::{Deserialize, Serialize};

/// Paging for the statistics endpoint.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatisticsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// A historical message as reported by the statistics endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MessageRecord {
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub template_name: Option<String>,
    #[serde(default)]
    pub external_message_id: Option<String>,
}

/// Response of the statistics endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StatisticsResponse {
    /// Aggregate counters; shape is owned by the backend.
    #[serde(default)]
    pub statistics: serde_json::Value,
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
}
