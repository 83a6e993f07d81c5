//! Messaging API HTTP client.

use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::types::{
    HealthStatus, SendTemplateRequest, SendTemplateResponse, StatisticsQuery, StatisticsResponse,
    TemplateDescriptor, TemplateList,
};

/// Client for the WhatsApp messaging API.
#[derive(Clone)]
pub struct WhatsappClient {
    http: Client,
    config: ApiConfig,
}

impl WhatsappClient {
    /// Build a client. No request is made until the first call.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(ApiError::Http)?;

        Ok(Self { http, config })
    }

    /// Check API readiness.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json(&self.config.health_url(), "/health").await
    }

    /// List available templates.
    pub async fn templates(&self) -> Result<Vec<TemplateDescriptor>, ApiError> {
        let list: TemplateList = self
            .get_json(&self.config.templates_url(), "/templates")
            .await?;
        Ok(list.templates)
    }

    /// Fetch details for a single template.
    pub async fn template_details(&self, name: &str) -> Result<Value, ApiError> {
        let url = self.config.template_url(name);
        self.get_json(&url, "/templates/{name}").await
    }

    /// Send a template message to one recipient.
    pub async fn send_template(
        &self,
        request: &SendTemplateRequest,
    ) -> Result<SendTemplateResponse, ApiError> {
        debug!(
            recipient = %request.phone_number,
            template = %request.template_name,
            "Sending template"
        );
        let builder = self
            .http
            .request(Method::POST, self.config.send_template_url())
            .json(request);
        let body: Value = self.execute(builder, "/send-template").await?;
        Ok(SendTemplateResponse::from_body(body))
    }

    /// Fetch message statistics and history.
    pub async fn statistics(&self, query: StatisticsQuery) -> Result<StatisticsResponse, ApiError> {
        let builder = self
            .http
            .request(Method::GET, self.config.statistics_url())
            .query(&query);
        self.execute(builder, "/statistics").await
    }

    /// Phone-level webhook configuration.
    pub async fn webhook_config(&self) -> Result<Value, ApiError> {
        self.get_json(&self.config.webhook_config_url(), "/webhook-config")
            .await
    }

    /// WABA-level webhook configuration.
    pub async fn waba_webhook_config(&self) -> Result<Value, ApiError> {
        self.get_json(&self.config.waba_webhook_config_url(), "/waba-webhook-config")
            .await
    }

    /// Get the configuration.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn get_json<R: DeserializeOwned>(&self, url: &str, path: &str) -> Result<R, ApiError> {
        let builder = self.http.request(Method::GET, url);
        self.execute(builder, path).await
    }

    /// Attach auth, send, and decode the body or map the failure.
    async fn execute<R: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        path: &str,
    ) -> Result<R, ApiError> {
        let builder = match self.config.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder.send().await.map_err(ApiError::Http)?;
        let status = response.status();
        let headers = response.headers().clone();

        if status == StatusCode::UNAUTHORIZED {
            warn!(path, "Messaging API rejected the access token");
            return Err(ApiError::Unauthorized);
        }

        let text = response.text().await.map_err(ApiError::Http)?;
        let body = decode_body(&headers, &text);

        if !status.is_success() {
            let message = error_message(&body, status.as_u16(), path);
            return Err(ApiError::Status {
                status: status.as_u16(),
                retry_after: parse_retry_after(&headers),
                message,
            });
        }

        serde_json::from_value(body).map_err(ApiError::Json)
    }
}

/// Parse the body as JSON, falling back to `{ "raw": text }`.
fn decode_body(headers: &HeaderMap, text: &str) -> Value {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));

    match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(e) => {
            if is_json {
                debug!(error = %e, "Response declared JSON but failed to parse");
            }
            serde_json::json!({ "raw": text })
        }
    }
}

/// Best-effort human readable message from an error payload.
pub fn error_message(body: &Value, status: u16, path: &str) -> String {
    let nested = body
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str);
    let top = body.get("message").and_then(Value::as_str);
    let plain = body.get("error").and_then(Value::as_str);

    nested
        .or(top)
        .or(plain)
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {} on {}", status, path))
}

/// `Retry-After` as integer seconds.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

impl std::fmt::Debug for WhatsappClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsappClient")
            .field("base_url", &self.config.base_url)
            .field("has_token", &self.config.has_token())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_error_message_prefers_nested() {
        let body = json!({"error": {"message": "Invalid phone"}, "message": "outer"});
        assert_eq!(error_message(&body, 400, "/send-template"), "Invalid phone");
    }

    #[test]
    fn test_error_message_top_level() {
        let body = json!({"message": "Rate limited"});
        assert_eq!(error_message(&body, 429, "/send-template"), "Rate limited");
    }

    #[test]
    fn test_error_message_fallback() {
        let body = json!({"raw": "<html>Bad gateway</html>"});
        assert_eq!(
            error_message(&body, 502, "/send-template"),
            "HTTP 502 on /send-template"
        );
    }

    #[test]
    fn test_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("5"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_retry_after_ignores_dates() {
        let mut headers = HeaderMap::new();
        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn test_decode_body_non_json() {
        let headers = HeaderMap::new();
        assert_eq!(decode_body(&headers, "oops"), json!({"raw": "oops"}));
    }

    #[test]
    fn test_request_body_omits_empty_params() {
        let body = serde_json::to_value(SendTemplateRequest::new("380733927425", "promo")).unwrap();
        assert_eq!(
            body,
            json!({"phone_number": "380733927425", "template_name": "promo"})
        );
    }
}
