//! Bulk sendout dispatch queue.
//!
//! A fixed number of worker futures share one cursor over the recipient
//! list. Each claimed recipient is attempted until it is sent or its retry
//! budget runs out. Rate limiting and server errors pause every worker;
//! other failures only back off the recipient that hit them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use futures::future::join_all;
use rand::Rng;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use whatsapp_api::ApiError;

use crate::backoff::FailureClass;
use crate::config::SendoutConfig;
use crate::error::SendoutError;
use crate::results::{ResultAggregator, SendoutEvent, SendoutSnapshot};
use crate::sender::TemplateSender;
use crate::throttle::Throttle;

/// Outcome of a finished sendout.
#[derive(Debug, Clone, Serialize)]
pub struct SendoutReport {
    pub template: String,
    pub snapshot: SendoutSnapshot,
    #[serde(with = "millis")]
    pub elapsed: Duration,
}

impl SendoutReport {
    pub fn sent(&self) -> usize {
        self.snapshot.sent()
    }

    pub fn failed(&self) -> usize {
        self.snapshot.failed()
    }
}

/// Runs sendouts through a [`TemplateSender`].
pub struct Dispatcher<S> {
    sender: S,
    config: SendoutConfig,
    updates: watch::Sender<SendoutSnapshot>,
}

impl<S: TemplateSender> Dispatcher<S> {
    pub fn new(sender: S, config: SendoutConfig) -> Self {
        let (updates, _) = watch::channel(SendoutSnapshot::default());
        Self {
            sender,
            config,
            updates,
        }
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    pub fn config(&self) -> &SendoutConfig {
        &self.config
    }

    /// Receive a fresh snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<SendoutSnapshot> {
        self.updates.subscribe()
    }

    /// Send `template` to every recipient and wait for all of them to reach
    /// a terminal state.
    ///
    /// Recipients are expected to be normalized and deduplicated already
    /// (see [`RecipientSet`](crate::RecipientSet)).
    pub async fn run(
        &self,
        recipients: &[String],
        template: &str,
    ) -> Result<SendoutReport, SendoutError> {
        if template.trim().is_empty() {
            return Err(SendoutError::NoTemplate);
        }
        if recipients.is_empty() {
            return Err(SendoutError::NoRecipients);
        }

        let workers = self.config.workers.max(1).min(recipients.len());
        info!(
            template,
            recipients = recipients.len(),
            workers,
            "Starting sendout"
        );

        let started = Instant::now();
        let run = Run {
            dispatcher: self,
            recipients,
            template,
            cursor: AtomicUsize::new(0),
            throttle: Throttle::new(),
            aggregator: Mutex::new(ResultAggregator::new(recipients.len())),
        };
        run.publish(|_| {});

        join_all((0..workers).map(|id| run.worker(id))).await;

        let snapshot = run.publish(|aggregator| aggregator.finish());
        let elapsed = started.elapsed();
        info!(
            template,
            sent = snapshot.sent(),
            failed = snapshot.failed(),
            pauses = snapshot.pauses,
            elapsed_ms = elapsed.as_millis() as u64,
            "Sendout finished"
        );

        Ok(SendoutReport {
            template: template.to_string(),
            snapshot,
            elapsed,
        })
    }
}

/// State shared by the workers of one sendout.
struct Run<'a, S> {
    dispatcher: &'a Dispatcher<S>,
    recipients: &'a [String],
    template: &'a str,
    cursor: AtomicUsize,
    throttle: Throttle,
    aggregator: Mutex<ResultAggregator>,
}

impl<S: TemplateSender> Run<'_, S> {
    async fn worker(&self, id: usize) {
        loop {
            let index = self.cursor.fetch_add(1, Ordering::SeqCst);
            let Some(recipient) = self.recipients.get(index) else {
                break;
            };

            debug!(worker = id, recipient = %recipient, "Claimed recipient");
            self.emit(SendoutEvent::Claimed {
                recipient: recipient.clone(),
            });
            self.process(id, recipient).await;
        }
        debug!(worker = id, "Worker exhausted queue");
    }

    async fn process(&self, id: usize, recipient: &str) {
        let config = &self.dispatcher.config;
        let mut attempts = 0u32;

        loop {
            self.wait_turn().await;

            attempts += 1;
            self.emit(SendoutEvent::Attempting {
                recipient: recipient.to_string(),
                attempt: attempts,
            });

            let error = match self
                .dispatcher
                .sender
                .send_template(recipient, self.template)
                .await
            {
                Ok(response) => {
                    info!(
                        worker = id,
                        recipient,
                        attempts,
                        message_id = ?response.message_id,
                        "Template sent"
                    );
                    self.emit(SendoutEvent::Sent {
                        recipient: recipient.to_string(),
                        attempts,
                        response,
                    });
                    return;
                }
                Err(e) => e,
            };

            let class = FailureClass::classify(&error);
            let message = error_text(&error);

            if class.pauses_globally() {
                let duration = config.retry.global_pause(attempts, error.retry_after());
                self.throttle.pause_for(duration);
                warn!(
                    worker = id,
                    recipient,
                    ?class,
                    pause_ms = duration.as_millis() as u64,
                    error = %message,
                    "Pausing all sends"
                );
                self.emit(SendoutEvent::Paused { duration });
            }

            if !config.retry.should_retry(attempts) {
                warn!(worker = id, recipient, attempts, error = %message, "Send failed");
                self.emit(SendoutEvent::Failed {
                    recipient: recipient.to_string(),
                    attempts,
                    error: message,
                });
                return;
            }

            debug!(worker = id, recipient, attempts, ?class, error = %message, "Retrying");
            self.emit(SendoutEvent::Retrying {
                recipient: recipient.to_string(),
                attempts,
                class,
                error: message,
            });

            if !class.pauses_globally() {
                tokio::time::sleep(config.retry.client_backoff()).await;
            }
        }
    }

    /// Wait out any global pause, then the per-worker pacing delay.
    ///
    /// A pause requested while pacing sends the worker back to waiting.
    async fn wait_turn(&self) {
        let config = &self.dispatcher.config;
        loop {
            self.throttle.wait_ready(config.poll_interval).await;
            tokio::time::sleep(pacing_delay(config)).await;
            if !self.throttle.is_paused() {
                return;
            }
        }
    }

    fn emit(&self, event: SendoutEvent) {
        self.publish(|aggregator| aggregator.apply(&event));
    }

    fn publish(&self, update: impl FnOnce(&mut ResultAggregator)) -> SendoutSnapshot {
        let mut aggregator = self
            .aggregator
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        update(&mut aggregator);
        let snapshot = aggregator.snapshot().clone();
        self.dispatcher.updates.send_replace(snapshot.clone());
        snapshot
    }
}

fn pacing_delay(config: &SendoutConfig) -> Duration {
    if config.jitter.is_zero() {
        return config.spacing;
    }
    config.spacing + rand::thread_rng().gen_range(Duration::ZERO..=config.jitter)
}

/// Text recorded as a recipient's last error.
fn error_text(error: &ApiError) -> String {
    match error {
        ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
        other => other.to_string(),
    }
}

mod millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pacing_within_bounds() {
        let config = SendoutConfig::default();
        for _ in 0..100 {
            let delay = pacing_delay(&config);
            assert!(delay >= config.spacing);
            assert!(delay <= config.spacing + config.jitter);
        }
    }

    #[test]
    fn test_pacing_without_jitter() {
        let config = SendoutConfig {
            jitter: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(pacing_delay(&config), config.spacing);
    }

    #[test]
    fn test_error_text_prefers_server_message() {
        let error = ApiError::Status {
            status: 400,
            retry_after: None,
            message: "Invalid phone number".to_string(),
        };
        assert_eq!(error_text(&error), "Invalid phone number");
        assert!(!error_text(&ApiError::Unauthorized).is_empty());
    }
}
