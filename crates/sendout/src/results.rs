//! Per-recipient send records and progress.
//!
//! The aggregator is a pure projection of dispatch events: it holds the
//! latest record per recipient and the progress percentage, and has no
//! logic of its own beyond refusing to touch finalized records.

use std::time::Duration;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;
use whatsapp_api::SendTemplateResponse;

use crate::backoff::FailureClass;

/// Lifecycle of one recipient within a sendout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SendStatus {
    Queued,
    Sending,
    Retrying,
    Sent,
    Failed,
}

impl SendStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SendStatus::Sent | SendStatus::Failed)
    }
}

impl std::fmt::Display for SendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendStatus::Queued => write!(f, "queued"),
            SendStatus::Sending => write!(f, "sending"),
            SendStatus::Retrying => write!(f, "retrying"),
            SendStatus::Sent => write!(f, "sent"),
            SendStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Latest known state of one recipient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendAttemptRecord {
    pub status: SendStatus,
    /// Attempts made so far (including the current one while sending).
    pub attempts: u32,
    pub last_error: Option<String>,
    pub message_id: Option<String>,
    pub external_message_id: Option<String>,
    /// Status string reported by the messaging service on success.
    pub remote_status: Option<String>,
    pub success: bool,
}

impl SendAttemptRecord {
    fn queued() -> Self {
        Self {
            status: SendStatus::Queued,
            attempts: 0,
            last_error: None,
            message_id: None,
            external_message_id: None,
            remote_status: None,
            success: false,
        }
    }
}

/// Something that happened during dispatch.
#[derive(Debug, Clone)]
pub enum SendoutEvent {
    /// A worker took the recipient off the queue.
    Claimed { recipient: String },
    /// An attempt is about to be made.
    Attempting { recipient: String, attempt: u32 },
    /// An attempt failed and another will follow.
    Retrying {
        recipient: String,
        attempts: u32,
        class: FailureClass,
        error: String,
    },
    Sent {
        recipient: String,
        attempts: u32,
        response: SendTemplateResponse,
    },
    /// Retry budget exhausted.
    Failed {
        recipient: String,
        attempts: u32,
        error: String,
    },
    /// A global pause was requested.
    Paused { duration: Duration },
}

/// Point-in-time view of a sendout.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SendoutSnapshot {
    /// Records in claim order.
    pub records: IndexMap<String, SendAttemptRecord>,
    pub total: usize,
    /// Recipients in a terminal state.
    pub completed: usize,
    /// `completed / total` as a rounded percentage.
    pub progress: u8,
    pub pauses: u64,
    /// Set once every worker has exited.
    pub finished: bool,
}

impl SendoutSnapshot {
    pub fn count(&self, status: SendStatus) -> usize {
        self.records.values().filter(|r| r.status == status).count()
    }

    pub fn sent(&self) -> usize {
        self.count(SendStatus::Sent)
    }

    pub fn failed(&self) -> usize {
        self.count(SendStatus::Failed)
    }
}

/// Folds events into a snapshot.
#[derive(Debug)]
pub struct ResultAggregator {
    snapshot: SendoutSnapshot,
}

impl ResultAggregator {
    pub fn new(total: usize) -> Self {
        Self {
            snapshot: SendoutSnapshot {
                total,
                progress: progress(0, total),
                ..Default::default()
            },
        }
    }

    pub fn apply(&mut self, event: &SendoutEvent) {
        match event {
            SendoutEvent::Claimed { recipient } => {
                self.snapshot
                    .records
                    .entry(recipient.clone())
                    .or_insert_with(SendAttemptRecord::queued);
            }
            SendoutEvent::Attempting { recipient, attempt } => {
                if let Some(record) = self.open_record(recipient) {
                    record.status = SendStatus::Sending;
                    record.attempts = *attempt;
                }
            }
            SendoutEvent::Retrying {
                recipient,
                attempts,
                error,
                ..
            } => {
                if let Some(record) = self.open_record(recipient) {
                    record.status = SendStatus::Retrying;
                    record.attempts = *attempts;
                    record.last_error = Some(error.clone());
                }
            }
            SendoutEvent::Sent {
                recipient,
                attempts,
                response,
            } => {
                if let Some(record) = self.open_record(recipient) {
                    record.status = SendStatus::Sent;
                    record.attempts = *attempts;
                    record.message_id = response.message_id.clone();
                    record.external_message_id = response.external_message_id.clone();
                    record.remote_status = response.status.clone();
                    record.success = response.success;
                    self.complete_one();
                }
            }
            SendoutEvent::Failed {
                recipient,
                attempts,
                error,
            } => {
                if let Some(record) = self.open_record(recipient) {
                    record.status = SendStatus::Failed;
                    record.attempts = *attempts;
                    record.last_error = Some(error.clone());
                    self.complete_one();
                }
            }
            SendoutEvent::Paused { .. } => {
                self.snapshot.pauses += 1;
            }
        }
    }

    /// Mark the sendout as finished.
    pub fn finish(&mut self) {
        self.snapshot.finished = true;
    }

    pub fn snapshot(&self) -> &SendoutSnapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> SendoutSnapshot {
        self.snapshot
    }

    /// Record for a recipient that has not yet reached a terminal state.
    fn open_record(&mut self, recipient: &str) -> Option<&mut SendAttemptRecord> {
        let record = self
            .snapshot
            .records
            .entry(recipient.to_string())
            .or_insert_with(SendAttemptRecord::queued);

        if record.status.is_terminal() {
            debug!(recipient, status = %record.status, "Ignoring event for finalized record");
            return None;
        }
        Some(record)
    }

    fn complete_one(&mut self) {
        self.snapshot.completed += 1;
        self.snapshot.progress = progress(self.snapshot.completed, self.snapshot.total);
    }
}

fn progress(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (completed as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}
