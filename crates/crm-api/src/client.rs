//! Dashboard API HTTP client.

use std::time::Duration;

use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::LoginResponse;
use crate::config::CrmConfig;
use crate::error::{CrmError, Result};
use crate::models::{ClientsPage, DashboardSummary, Distribution, RawClient};
use crate::range::DateRange;

/// Default page size for the client listing.
pub const DEFAULT_PER_PAGE: u32 = 100;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Client for the ClientIQ dashboard API.
#[derive(Clone)]
pub struct CrmClient {
    http: HttpClient,
    config: CrmConfig,
}

impl CrmClient {
    pub fn new(config: CrmConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(CrmError::Http)?;

        Ok(Self { http, config })
    }

    /// Exchange credentials for an access token.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<LoginResponse> {
        let body = LoginRequest {
            username,
            password: password.expose_secret(),
        };

        let response = self
            .http
            .post(self.config.login_url())
            .json(&body)
            .send()
            .await
            .map_err(CrmError::Http)?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(CrmError::InvalidCredentials),
            status if !status.is_success() => {
                Err(CrmError::LoginFailed(format!("HTTP {}", status.as_u16())))
            }
            _ => {
                let login: LoginResponse = response.json().await.map_err(CrmError::Http)?;
                info!(username, expires_in = login.expires_in, "Logged in");
                Ok(login)
            }
        }
    }

    /// KPI summary for a date range.
    pub async fn summary(&self, range: &DateRange) -> Result<DashboardSummary> {
        let builder = self.http.get(self.config.summary_url()).query(&range.query());
        self.execute(builder, "Summary").await
    }

    /// Mark distributions for a date range.
    pub async fn distribution(&self, range: &DateRange) -> Result<Distribution> {
        let builder = self
            .http
            .get(self.config.distribution_url())
            .query(&range.query());
        self.execute(builder, "Distribution").await
    }

    /// A single page of clients (pages are 1-based).
    pub async fn clients_page(
        &self,
        range: &DateRange,
        page: u32,
        per_page: u32,
    ) -> Result<ClientsPage> {
        let builder = self
            .http
            .get(self.config.clients_url())
            .query(&range.query())
            .query(&[("per_page", per_page), ("page", page)]);
        self.execute(builder, "Clients").await
    }

    /// Every client in the range, walking all pages.
    pub async fn all_clients(&self, range: &DateRange, per_page: u32) -> Result<Vec<RawClient>> {
        let mut page = 1;
        let mut pages = 1;
        let mut clients = Vec::new();

        while page <= pages {
            let result = self.clients_page(range, page, per_page).await?;
            debug!(page, pages = result.pages, count = result.clients.len(), "Fetched clients page");
            pages = result.pages;
            clients.extend(result.clients);
            page += 1;
        }

        Ok(clients)
    }

    /// Full detail record for one client.
    pub async fn client(&self, id: &str) -> Result<Value> {
        let builder = self.http.get(self.config.client_url(id));
        self.execute(builder, "Client").await
    }

    pub fn config(&self) -> &CrmConfig {
        &self.config
    }

    async fn execute<R: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        api: &'static str,
    ) -> Result<R> {
        let builder = match self.config.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder.send().await.map_err(CrmError::Http)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!(api, "Dashboard API rejected the access token");
            return Err(CrmError::Unauthorized);
        }
        if !status.is_success() {
            return Err(CrmError::Status {
                api,
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(CrmError::Http)
    }
}

impl std::fmt::Debug for CrmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrmClient")
            .field("base_url", &self.config.base_url)
            .field("has_token", &self.config.has_token())
            .finish()
    }
}
