//! Bulk WhatsApp template sendouts.
//!
//! This crate turns a pasted or uploaded list of phone numbers into a paced,
//! retried sendout of one template:
//!
//! - Recipient normalization and de-duplication
//! - Template selection from the messaging catalog
//! - A worker pool with per-worker pacing, retry, and a global pause on
//!   rate limiting or server errors
//! - Live per-recipient results and progress over a watch channel
//! - Message history filtering, grouping, and export
//!
//! # Example
//!
//! ```no_run
//! use sendout::{Dispatcher, RecipientSet, SendoutConfig};
//! use whatsapp_api::{ApiConfig, WhatsappClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = WhatsappClient::new(ApiConfig::from_env()?)?;
//! let recipients = RecipientSet::merge("+380 73 392 7425, 380733927426", &[]);
//!
//! let dispatcher = Dispatcher::new(client, SendoutConfig::default());
//! let mut updates = dispatcher.subscribe();
//! tokio::spawn(async move {
//!     while updates.changed().await.is_ok() {
//!         println!("progress: {}%", updates.borrow().progress);
//!     }
//! });
//!
//! let report = dispatcher.run(&recipients.into_vec(), "spring_promo").await?;
//! println!("sent {}, failed {}", report.sent(), report.failed());
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod history;
pub mod recipients;
pub mod results;
pub mod sender;
pub mod templates;
pub mod throttle;

pub use backoff::{FailureClass, RetryPolicy};
pub use config::SendoutConfig;
pub use dispatch::{Dispatcher, SendoutReport};
pub use error::SendoutError;
pub use history::{group_sendouts, HistoryFilter, SendoutGroup};
pub use recipients::{
    normalize_phone, parse_csv_single_column, parse_manual, RecipientError, RecipientSet,
};
pub use results::{ResultAggregator, SendAttemptRecord, SendStatus, SendoutEvent, SendoutSnapshot};
pub use sender::{DryRunSender, TemplateSender};
pub use templates::{TemplateCatalog, TemplateRef};
pub use throttle::Throttle;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
