//! ClientIQ WhatsApp messaging API client.
//!
//! This crate provides a typed client for the messaging service used by
//! sendouts. It supports:
//!
//! - Health checks and template catalog listing
//! - Sending zero-parameter template messages
//! - Message statistics and webhook configuration lookups
//!
//! # Example
//!
//! ```no_run
//! use whatsapp_api::{ApiConfig, SendTemplateRequest, WhatsappClient};
//!
//! # async fn example() -> Result<(), whatsapp_api::ApiError> {
//! let config = ApiConfig::default().with_token("access-token");
//! let client = WhatsappClient::new(config)?;
//!
//! if client.health().await?.is_healthy() {
//!     let templates = client.templates().await?;
//!     let request = SendTemplateRequest::new("380733927425", &templates[0].name);
//!     let sent = client.send_template(&request).await?;
//!     println!("message id: {:?}", sent.message_id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::WhatsappClient;
pub use config::ApiConfig;
pub use error::ApiError;
pub use types::*;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
