//! ClientIQ dashboard API client.
//!
//! Covers login and token persistence, the KPI summary, mark distributions,
//! the paginated client listing, and client-side filtering of clients by
//! their scoring marks.
//!
//! # Example
//!
//! ```no_run
//! use crm_api::{CrmClient, CrmConfig, DateRange, MarksFilter};
//!
//! # async fn example() -> crm_api::Result<()> {
//! let client = CrmClient::new(CrmConfig::default().with_token("access-token"))?;
//! let range = DateRange::default();
//!
//! let clients: Vec<crm_api::Client> = client
//!     .all_clients(&range, crm_api::DEFAULT_PER_PAGE)
//!     .await?
//!     .into_iter()
//!     .map(Into::into)
//!     .collect();
//!
//! let filter = MarksFilter::for_clients(&clients);
//! println!("{} clients in {}", filter.apply(&clients).len(), range);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod range;

pub use auth::{AccessToken, LoginResponse, TokenStore};
pub use client::{CrmClient, DEFAULT_PER_PAGE};
pub use config::CrmConfig;
pub use error::{CrmError, Result};
pub use filter::{max_ltv, MarkRange, MarksFilter};
pub use models::{Client, ClientsPage, CrmData, DashboardSummary, Distribution, Marks, RawClient};
pub use range::DateRange;
