//! Seller company profile (singleton row).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The seller's registered profile. Exactly one row exists (id = 1); the
/// invoice engine reads it to determine the supplying state and the details
/// printed on issued invoices.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: i64,
    pub company_name: String,
    pub company_address: String,
    pub company_state: String,
    pub company_gst_number: String,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_ifsc_code: Option<String>,
    pub upi_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Full replacement of the company profile via the admin path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCompany {
    pub company_name: String,
    pub company_address: String,
    pub company_state: String,
    pub company_gst_number: String,
    #[serde(default)]
    pub company_email: Option<String>,
    #[serde(default)]
    pub company_phone: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub bank_account_number: Option<String>,
    #[serde(default)]
    pub bank_ifsc_code: Option<String>,
    #[serde(default)]
    pub upi_id: Option<String>,
}
