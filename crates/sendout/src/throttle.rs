//! Process-wide send pause.
//!
//! Any worker that hits rate limiting or a server error extends the pause;
//! every worker checks it before each attempt. Pauses only ever move the
//! deadline forward: a shorter request never cuts an in-flight longer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Shared "paused until" deadline.
#[derive(Debug, Default)]
pub struct Throttle {
    paused_until: Mutex<Option<Instant>>,
    pauses: AtomicU64,
}

impl Throttle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause all sends for `duration` from now, keeping any later deadline.
    /// Returns the effective deadline.
    pub fn pause_for(&self, duration: Duration) -> Instant {
        let requested = Instant::now() + duration;
        let mut guard = self
            .paused_until
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let effective = match *guard {
            Some(existing) if existing > requested => existing,
            _ => requested,
        };
        *guard = Some(effective);
        self.pauses.fetch_add(1, Ordering::SeqCst);

        debug!(
            requested_ms = duration.as_millis() as u64,
            "Global send pause applied"
        );
        effective
    }

    /// Current deadline, if one is set and not yet elapsed.
    pub fn paused_until(&self) -> Option<Instant> {
        let guard = self
            .paused_until
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.filter(|deadline| *deadline > Instant::now())
    }

    pub fn is_paused(&self) -> bool {
        self.paused_until().is_some()
    }

    /// Number of pause requests so far.
    pub fn pauses(&self) -> u64 {
        self.pauses.load(Ordering::SeqCst)
    }

    /// Poll every `poll_interval` until no pause is active.
    pub async fn wait_ready(&self, poll_interval: Duration) {
        while let Some(deadline) = self.paused_until() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            tokio::time::sleep(remaining.min(poll_interval)).await;
        }
    }
}
