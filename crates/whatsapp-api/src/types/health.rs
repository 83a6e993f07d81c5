//! Health check types.

use serde::{Deserialize, Serialize};

/// Messaging API readiness.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub api_key_valid: bool,
}

impl HealthStatus {
    /// Healthy when the API key is valid and status is not "unhealthy".
    pub fn is_healthy(&self) -> bool {
        let unhealthy = self
            .status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("unhealthy"));
        self.api_key_valid && !unhealthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_requires_valid_key() {
        let health = HealthStatus {
            status: Some("healthy".to_string()),
            api_key_valid: false,
        };
        assert!(!health.is_healthy());
    }

    #[test]
    fn test_health_unhealthy_status() {
        let health = HealthStatus {
            status: Some("UNHEALTHY".to_string()),
            api_key_valid: true,
        };
        assert!(!health.is_healthy());
    }

    #[test]
    fn test_health_missing_status_is_ok() {
        let health: HealthStatus = serde_json::from_str(r#"{"api_key_valid": true}"#).unwrap();
        assert!(health.is_healthy());
    }
}
