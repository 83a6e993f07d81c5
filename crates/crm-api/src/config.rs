//! Configuration types for crm-api.

use std::env;

use secrecy::{ExposeSecret, SecretString};

use crate::error::{CrmError, Result};

/// Default dashboard API base URL.
pub const DEFAULT_BASE_URL: &str = "https://clientiq.apltravel.ua";

/// Configuration for connecting to the dashboard API.
#[derive(Debug, Clone)]
pub struct CrmConfig {
    /// Base URL of the dashboard API (without the `/api` suffix).
    pub base_url: String,
    token: Option<SecretString>,
}

impl CrmConfig {
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

    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CLIENTIQ_API_URL` | Dashboard API base URL | `https://clientiq.apltravel.ua` |
    pub fn from_env() -> Result<Self> {
        let base_url =
            env::var("CLIENTIQ_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(CrmError::Config(format!(
                "CLIENTIQ_API_URL must be http(s): {}",
                base_url
            )));
        }

        Ok(Self::new(base_url))
    }

    pub(crate) fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret())
    }

    /// Whether a bearer token is configured.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn login_url(&self) -> String {
        format!("{}/api/auth/login", self.base_url)
    }

    pub fn summary_url(&self) -> String {
        format!("{}/api/admin/dashboard-summary", self.base_url)
    }

    pub fn distribution_url(&self) -> String {
        format!("{}/api/admin/distribution", self.base_url)
    }

    pub fn clients_url(&self) -> String {
        format!("{}/api/admin/clients", self.base_url)
    }

    pub fn client_url(&self, id: &str) -> String {
        format!("{}/api/admin/clients/{}", self.base_url, id)
    }
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_not_in_debug_output() {
        let config = CrmConfig::new("http://localhost:8000/").with_token("s3cr3t-token");

        assert_eq!(config.login_url(), "http://localhost:8000/api/auth/login");
        assert!(config.has_token());
        assert_eq!(config.token(), Some("s3cr3t-token"));
        assert!(!format!("{:?}", config).contains("s3cr3t-token"));
    }
}
