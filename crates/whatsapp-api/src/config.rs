//! Configuration types for whatsapp-api.

use std::env;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ApiError;

/// Default messaging API base URL.
pub const DEFAULT_BASE_URL: &str = "https://clientiq.apltravel.ua/api/messaging/whatsapp";

/// Configuration for connecting to the messaging API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the messaging API (e.g., "https://host/api/messaging/whatsapp").
    pub base_url: String,
    /// Bearer token attached to every request.
    token: Option<SecretString>,
}

impl ApiConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Create configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CLIENTIQ_MESSAGING_URL` | Messaging API base URL | `{CLIENTIQ_API_URL}/api/messaging/whatsapp` |
    /// | `CLIENTIQ_API_URL` | Dashboard API base URL | `https://clientiq.apltravel.ua` |
    pub fn from_env() -> Result<Self, ApiError> {
        let base_url = match env::var("CLIENTIQ_MESSAGING_URL") {
            Ok(url) => url,
            Err(_) => match env::var("CLIENTIQ_API_URL") {
                Ok(api) => format!("{}/api/messaging/whatsapp", api.trim_end_matches('/')),
                Err(_) => DEFAULT_BASE_URL.to_string(),
            },
        };

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::Config(format!(
                "messaging URL must be http(s): {}",
                base_url
            )));
        }

        Ok(Self::new(base_url))
    }

    /// Whether a bearer token is configured.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret())
    }

    /// Get the health check endpoint URL.
    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }

    /// Get the template list endpoint URL.
    pub fn templates_url(&self) -> String {
        format!("{}/templates", self.base_url)
    }

    /// Get the endpoint URL for a single template (name is URL-encoded).
    pub fn template_url(&self, name: &str) -> String {
        format!("{}/templates/{}", self.base_url, urlencoding::encode(name))
    }

    /// Get the send-template endpoint URL.
    pub fn send_template_url(&self) -> String {
        format!("{}/send-template", self.base_url)
    }

    /// Get the statistics endpoint URL.
    pub fn statistics_url(&self) -> String {
        format!("{}/statistics", self.base_url)
    }

    /// Phone-level webhook config.
    pub fn webhook_config_url(&self) -> String {
        format!("{}/webhook-config", self.base_url)
    }

    /// WABA-level webhook config.
    pub fn waba_webhook_config_url(&self) -> String {
        format!("{}/waba-webhook-config", self.base_url)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_not_in_debug_output() {
        let config = ApiConfig::new("http://localhost:8000/").with_token("s3cr3t-token");

        assert_eq!(config.base_url, "http://localhost:8000");
        assert!(config.has_token());
        assert_eq!(config.token(), Some("s3cr3t-token"));
        assert!(!format!("{:?}", config).contains("s3cr3t-token"));
    }
}
