//! Client (buyer) model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered buyer. Read-only during invoice creation; the client's
/// address and state are snapshotted into the invoice at that point.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: i64,
    pub client_name: String,
    pub client_address: String,
    pub client_state: String,
    pub client_gst_number: String,
    pub client_mobile: Option<String>,
    pub client_email: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_ifsc_code: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for registering a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClient {
    pub client_name: String,
    pub client_address: String,
    pub client_state: String,
    pub client_gst_number: String,
    #[serde(default)]
    pub client_mobile: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub bank_account_number: Option<String>,
    #[serde(default)]
    pub bank_ifsc_code: Option<String>,
}

/// Patch for an existing client; omitted fields keep their prior values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClient {
    pub client_name: Option<String>,
    pub client_address: Option<String>,
    pub client_state: Option<String>,
    pub client_mobile: Option<String>,
    pub client_email: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_ifsc_code: Option<String>,
}
