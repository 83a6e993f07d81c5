//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use crm_api::{CrmConfig, CrmError};
use sendout::{SendoutConfig, SendoutError};
use whatsapp_api::{ApiConfig, ApiError};

/// Default location of the persisted access token.
pub const DEFAULT_TOKEN_PATH: &str = ".clientiq/token.json";

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Dashboard API settings.
    pub crm: CrmConfig,
    /// Messaging API settings.
    pub messaging: ApiConfig,
    /// Where the access token is stored between runs.
    pub token_path: PathBuf,
    /// Dispatch queue tuning.
    pub sendout: SendoutConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CLIENTIQ_API_URL` | Dashboard API base URL | `https://clientiq.apltravel.ua` |
    /// | `CLIENTIQ_MESSAGING_URL` | Messaging API base URL | `{CLIENTIQ_API_URL}/api/messaging/whatsapp` |
    /// | `CLIENTIQ_TOKEN_PATH` | Token file | `.clientiq/token.json` |
    /// | `SENDOUT_WORKERS` | Concurrent send workers | `3` |
    /// | `SENDOUT_MAX_ATTEMPTS` | Attempts per recipient | `3` |
    /// | `SENDOUT_SPACING_MS` | Per-worker spacing | `350` |
    /// | `SENDOUT_JITTER_MS` | Max random jitter | `150` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let crm = CrmConfig::from_env()?;
        let messaging = ApiConfig::from_env()?;

        let token_path = env::var("CLIENTIQ_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TOKEN_PATH));

        let sendout = SendoutConfig::from_env()?;

        Ok(Self {
            crm,
            messaging,
            token_path,
            sendout,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Dashboard API: {0}")]
    Crm(#[from] CrmError),

    #[error("Messaging API: {0}")]
    Messaging(#[from] ApiError),

    #[error("Sendout: {0}")]
    Sendout(#[from] SendoutError),
}
