//! Catalog item model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A sellable catalog entry. Its rates and price are copied into invoice
/// lines at creation time, so later edits never alter issued invoices.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: i64,
    pub item_name: String,
    pub description: Option<String>,
    pub hsn_code: Option<String>,
    pub unit: Option<String>,
    pub cgst_rate: Decimal,
    pub sgst_rate: Decimal,
    pub igst_rate: Decimal,
    pub price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for adding a catalog item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItem {
    pub item_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub hsn_code: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    pub cgst_rate: Decimal,
    pub sgst_rate: Decimal,
    pub igst_rate: Decimal,
    pub price: Decimal,
}

/// Patch for an existing item; omitted fields keep their prior values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItem {
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub hsn_code: Option<String>,
    pub unit: Option<String>,
    pub cgst_rate: Option<Decimal>,
    pub sgst_rate: Option<Decimal>,
    pub igst_rate: Option<Decimal>,
    pub price: Option<Decimal>,
}
