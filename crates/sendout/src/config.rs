//! Dispatch tuning.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::backoff::RetryPolicy;
use crate::error::SendoutError;

/// Dispatch queue settings.
#[derive(Debug, Clone)]
pub struct SendoutConfig {
    /// Concurrent workers, i.e. the maximum number of sends in flight.
    pub workers: usize,
    pub retry: RetryPolicy,
    /// Minimum delay each worker waits before every attempt.
    pub spacing: Duration,
    /// Upper bound of the random delay added to `spacing`.
    pub jitter: Duration,
    /// How often a paused worker re-checks the global pause.
    pub poll_interval: Duration,
}

impl Default for SendoutConfig {
    fn default() -> Self {
        Self {
            workers: 3,
            retry: RetryPolicy::default(),
            spacing: Duration::from_millis(350),
            jitter: Duration::from_millis(150),
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl SendoutConfig {
    /// Load overrides from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `SENDOUT_WORKERS` | Concurrent workers | `3` |
    /// | `SENDOUT_MAX_ATTEMPTS` | Attempts per recipient | `3` |
    /// | `SENDOUT_SPACING_MS` | Per-worker spacing | `350` |
    /// | `SENDOUT_JITTER_MS` | Max random jitter | `150` |
    pub fn from_env() -> Result<Self, SendoutError> {
        let defaults = Self::default();

        let workers = env_number("SENDOUT_WORKERS", defaults.workers)?;
        let max_attempts = env_number("SENDOUT_MAX_ATTEMPTS", defaults.retry.max_attempts)?;
        let spacing = env_number("SENDOUT_SPACING_MS", defaults.spacing.as_millis() as u64)?;
        let jitter = env_number("SENDOUT_JITTER_MS", defaults.jitter.as_millis() as u64)?;

        Self {
            workers,
            retry: RetryPolicy {
                max_attempts,
                ..defaults.retry
            },
            spacing: Duration::from_millis(spacing),
            jitter: Duration::from_millis(jitter),
            ..defaults
        }
        .validate()
    }

    /// Builder method to set the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Reject settings the dispatch queue cannot run with.
    pub fn validate(self) -> Result<Self, SendoutError> {
        if self.workers == 0 {
            return Err(SendoutError::Config("workers must be at least 1".to_string()));
        }
        if self.retry.max_attempts == 0 {
            return Err(SendoutError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.poll_interval.is_zero() || self.poll_interval >= Duration::from_secs(1) {
            return Err(SendoutError::Config(
                "poll_interval must be between 0 and 1 second".to_string(),
            ));
        }
        Ok(self)
    }
}

fn env_number<T: FromStr>(name: &str, default: T) -> Result<T, SendoutError> {
    parse_number(name, env::var(name).ok().as_deref(), default)
}

/// Parse an unsigned setting into its target type, rejecting values that
/// do not fit instead of truncating them.
fn parse_number<T: FromStr>(
    name: &str,
    raw: Option<&str>,
    default: T,
) -> Result<T, SendoutError> {
    match raw {
        Some(value) => value.trim().parse().map_err(|_| {
            SendoutError::Config(format!(
                "{} must be a non-negative integer in range, got {:?}",
                name, value
            ))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SendoutConfig::default().validate().unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(SendoutConfig::default().with_workers(0).validate().is_err());
    }

    #[test]
    fn test_out_of_range_number_rejected() {
        let err = parse_number::<u32>("SENDOUT_MAX_ATTEMPTS", Some("4294967297"), 3).unwrap_err();
        assert!(matches!(err, SendoutError::Config(ref m) if m.contains("SENDOUT_MAX_ATTEMPTS")));
        assert!(parse_number::<usize>("SENDOUT_WORKERS", Some("-1"), 3).is_err());
        assert!(parse_number::<u64>("SENDOUT_SPACING_MS", Some("fast"), 350).is_err());

        assert_eq!(parse_number::<u32>("SENDOUT_MAX_ATTEMPTS", Some(" 5 "), 3).unwrap(), 5);
        assert_eq!(parse_number::<u32>("SENDOUT_MAX_ATTEMPTS", None, 3).unwrap(), 3);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = SendoutConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
