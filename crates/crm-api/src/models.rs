//! Dashboard response models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// KPI summary for the selected date range.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub total_clients: Option<i64>,
    #[serde(default)]
    pub like_to_engage: Option<f64>,
    #[serde(default)]
    pub like_to_purchase: Option<f64>,
    #[serde(default)]
    pub like_to_churn: Option<f64>,
    #[serde(default)]
    pub ltv: Option<f64>,
    /// Any counters the dashboard adds later.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Mark distributions for charts.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Distribution {
    #[serde(default)]
    pub distributions: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of the client listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientsPage {
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub clients: Vec<RawClient>,
}

/// A client as returned by the listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawClient {
    pub id: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub last_purchase: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default, rename = "type")]
    pub purchase_type: Option<String>,
    #[serde(default)]
    pub engage: Option<f64>,
    #[serde(default)]
    pub purchase: Option<f64>,
    #[serde(default)]
    pub churn: Option<f64>,
    #[serde(default)]
    pub ltv: Option<f64>,
}

/// Last purchase details from the CRM.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrmData {
    pub last_purchase_date: Option<String>,
    pub last_purchase_cost: Option<f64>,
    pub last_purchase_type: Option<String>,
}

/// Scoring marks. Engagement, purchase and churn are on a 0–10 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Marks {
    pub like_to_engage: f64,
    pub like_to_purchase: f64,
    pub like_to_churn: f64,
    pub ltv: f64,
}

/// Normalized client record used for filtering and display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    pub id: String,
    pub client_name: Option<String>,
    pub client_phone_number: Option<String>,
    pub crm_data: CrmData,
    pub marks: Marks,
}

impl From<RawClient> for Client {
    fn from(raw: RawClient) -> Self {
        Self {
            id: raw.id,
            client_name: raw.client_name,
            client_phone_number: raw.phone,
            crm_data: CrmData {
                last_purchase_date: raw.last_purchase,
                last_purchase_cost: raw.cost,
                last_purchase_type: raw.purchase_type,
            },
            marks: Marks {
                like_to_engage: raw.engage.unwrap_or(0.0),
                like_to_purchase: raw.purchase.unwrap_or(0.0),
                like_to_churn: raw.churn.unwrap_or(0.0),
                ltv: raw.ltv.unwrap_or(0.0),
            },
        }
    }
}
