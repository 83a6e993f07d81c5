//! Login response handling and access token persistence.
//!
//! A login yields a bearer token with a lifetime in seconds. The token is
//! persisted as JSON together with its absolute expiry so later invocations
//! can reuse it until it lapses. Expired tokens are removed on load.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CrmError, Result};

/// Body of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

/// A bearer token with an absolute expiry.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

impl AccessToken {
    /// Build from a login response received at `now`.
    ///
    /// Fails when `expires_in` does not yield a representable expiry.
    pub fn from_login(response: LoginResponse, now: DateTime<Utc>) -> Result<Self> {
        let expires_at = Duration::try_seconds(response.expires_in)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                CrmError::LoginFailed(format!("invalid expires_in: {}", response.expires_in))
            })?;

        Ok(Self {
            access_token: response.access_token,
            expires_at,
            user: response.user,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// File-backed token storage.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a token, creating parent directories as needed.
    pub fn save(&self, token: &AccessToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(token)?;
        fs::write(&self.path, json)?;
        info!(path = %self.path.display(), expires_at = %token.expires_at, "Access token saved");
        Ok(())
    }

    /// Load a token that is still valid at `now`.
    ///
    /// Returns `None` when no token is stored. An expired token is deleted
    /// and also yields `None`.
    pub fn load(&self, now: DateTime<Utc>) -> Result<Option<AccessToken>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let token: AccessToken = serde_json::from_str(&json)?;
        if token.is_expired(now) {
            debug!(expires_at = %token.expires_at, "Stored token expired, removing");
            self.clear()?;
            return Ok(None);
        }

        Ok(Some(token))
    }

    /// Remove the stored token. Missing file is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn login(expires_in: i64) -> LoginResponse {
        LoginResponse {
            access_token: "tok".to_string(),
            expires_in,
            token_type: Some("bearer".to_string()),
            user: None,
        }
    }

    #[test]
    fn test_expiry_from_login() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let token = AccessToken::from_login(login(3600), now).unwrap();
        assert_eq!(
            token.expires_at,
            Utc.with_ymd_and_hms(2025, 1, 1, 13, 0, 0).unwrap()
        );
        assert!(!token.is_expired(now));
        assert!(token.is_expired(now + Duration::seconds(3601)));
    }

    #[test]
    fn test_huge_expires_in_rejected() {
        let now = Utc::now();
        for expires_in in [i64::MAX, i64::MIN] {
            let err = AccessToken::from_login(login(expires_in), now).unwrap_err();
            assert!(matches!(err, CrmError::LoginFailed(_)), "{:?}", err);
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = AccessToken::from_login(login(60), Utc::now()).unwrap();
        assert!(!format!("{:?}", token).contains("tok\""));
    }

    #[test]
    fn test_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nested/token.json"));
        let now = Utc::now();
        store.save(&AccessToken::from_login(login(600), now).unwrap()).unwrap();

        let loaded = store.load(now).unwrap().expect("token should load");
        assert_eq!(loaded.access_token, "tok");
    }

    #[test]
    fn test_store_drops_expired_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        let now = Utc::now();
        store.save(&AccessToken::from_login(login(10), now).unwrap()).unwrap();

        assert!(store.load(now + Duration::seconds(11)).unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("absent.json"));
        assert!(store.load(Utc::now()).unwrap().is_none());
        store.clear().unwrap();
    }
}
