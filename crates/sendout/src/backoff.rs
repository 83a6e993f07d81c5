//! Retry policy and failure classification.

use std::time::Duration;

use rand::Rng;
use whatsapp_api::ApiError;

/// How a failed send is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// HTTP 429. Pauses every worker.
    RateLimited,
    /// HTTP 5xx or a network-level failure. Pauses every worker.
    ServerError,
    /// Any other rejection. Short local backoff only.
    ClientError,
}

impl FailureClass {
    pub fn classify(error: &ApiError) -> Self {
        match error {
            ApiError::Status { status: 429, .. } => FailureClass::RateLimited,
            e if e.is_throttling() => FailureClass::ServerError,
            _ => FailureClass::ClientError,
        }
    }

    /// Whether this failure pauses the whole sendout.
    pub fn pauses_globally(self) -> bool {
        matches!(self, FailureClass::RateLimited | FailureClass::ServerError)
    }
}

/// Retry budget and delays.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts per recipient before it is marked failed.
    pub max_attempts: u32,
    /// Global pause after the first throttling failure.
    pub base_delay: Duration,
    /// Growth factor per additional attempt.
    pub multiplier: f64,
    /// Cap for computed global pauses.
    pub max_delay: Duration,
    /// Lower bound of the local backoff after a client error.
    pub client_backoff_min: Duration,
    /// Upper bound of the local backoff after a client error.
    pub client_backoff_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(30),
            client_backoff_min: Duration::from_millis(250),
            client_backoff_max: Duration::from_millis(750),
        }
    }
}

impl RetryPolicy {
    /// Exponential delay for a 1-based attempt number, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let delay_ms = self.base_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        if !delay_ms.is_finite() || delay_ms >= self.max_delay.as_millis() as f64 {
            return self.max_delay;
        }
        Duration::from_millis(delay_ms.max(0.0) as u64)
    }

    /// Global pause after a throttling failure: the server's hint when
    /// present, otherwise the exponential delay.
    pub fn global_pause(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or_else(|| self.delay_for_attempt(attempt))
    }

    /// Randomized local backoff after a client error.
    pub fn client_backoff(&self) -> Duration {
        let (min, max) = (self.client_backoff_min, self.client_backoff_max);
        if max <= min {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }

    /// Whether another attempt is allowed after `attempts` failures.
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> ApiError {
        ApiError::Status {
            status: code,
            retry_after: None,
            message: String::new(),
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(FailureClass::classify(&status(429)), FailureClass::RateLimited);
        assert_eq!(FailureClass::classify(&status(500)), FailureClass::ServerError);
        assert_eq!(FailureClass::classify(&status(503)), FailureClass::ServerError);
        assert_eq!(FailureClass::classify(&status(400)), FailureClass::ClientError);
        assert_eq!(
            FailureClass::classify(&ApiError::Unauthorized),
            FailureClass::ClientError
        );
    }

    #[test]
    fn test_delay_calculation() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(4));
    }

    #[test]
    fn test_delay_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(30));
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn test_delay_non_decreasing() {
        let policy = RetryPolicy::default();
        let delays: Vec<Duration> = (1..=20).map(|a| policy.delay_for_attempt(a)).collect();
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_retry_hint_wins() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.global_pause(1, Some(Duration::from_secs(5))),
            Duration::from_secs(5)
        );
        assert_eq!(policy.global_pause(2, None), Duration::from_secs(2));
    }

    #[test]
    fn test_client_backoff_bounds() {
        let policy = RetryPolicy::default();
        for _ in 0..100 {
            let delay = policy.client_backoff();
            assert!(delay >= policy.client_backoff_min && delay <= policy.client_backoff_max);
        }
    }

    #[test]
    fn test_should_retry_budget() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(0));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
    }
}
