//! Template sender trait and implementations.

use async_trait::async_trait;
use whatsapp_api::{ApiError, SendTemplateRequest, SendTemplateResponse, WhatsappClient};

/// Sends one zero-parameter template message to one recipient.
///
/// Abstracted so the dispatch queue can run against the live messaging API
/// or a scripted sender in tests.
#[async_trait]
pub trait TemplateSender: Send + Sync {
    /// Send `template` to the normalized phone number `recipient`.
    async fn send_template(
        &self,
        recipient: &str,
        template: &str,
    ) -> Result<SendTemplateResponse, ApiError>;
}

#[async_trait]
impl TemplateSender for WhatsappClient {
    async fn send_template(
        &self,
        recipient: &str,
        template: &str,
    ) -> Result<SendTemplateResponse, ApiError> {
        let request = SendTemplateRequest::new(recipient, template);
        WhatsappClient::send_template(self, &request).await
    }
}

#[async_trait]
impl<T: TemplateSender + ?Sized> TemplateSender for Box<T> {
    async fn send_template(
        &self,
        recipient: &str,
        template: &str,
    ) -> Result<SendTemplateResponse, ApiError> {
        (**self).send_template(recipient, template).await
    }
}

/// A sender that logs instead of sending; every send succeeds.
#[derive(Debug, Clone, Default)]
pub struct DryRunSender;

#[async_trait]
impl TemplateSender for DryRunSender {
    async fn send_template(
        &self,
        recipient: &str,
        template: &str,
    ) -> Result<SendTemplateResponse, ApiError> {
        tracing::info!(recipient, template, "[dry-run] Would send template");
        Ok(SendTemplateResponse {
            status: Some("dry-run".to_string()),
            success: true,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_sender() {
        let sender = DryRunSender;
        let resp = sender.send_template("380733927425", "promo").await.unwrap();
        assert!(resp.success);
        assert_eq!(resp.status.as_deref(), Some("dry-run"));
        assert!(resp.message_id.is_none());
    }

    #[tokio::test]
    async fn test_boxed_sender() {
        let sender: Box<dyn TemplateSender> = Box::new(DryRunSender);
        assert!(sender.send_template("380733927425", "promo").await.is_ok());
    }
}
