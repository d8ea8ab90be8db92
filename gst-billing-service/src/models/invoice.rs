//! Invoice model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Invoice status. `Finalized` on creation; the only transition is to
/// `Cancelled`, which never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Finalized,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Finalized => "finalized",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

}

/// An issued invoice header. Aggregate totals are sums of the already
/// rounded per-line components, re-rounded to two decimals.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub client_id: i64,
    pub status: String,
    pub shipping_address: String,
    pub shipping_state: String,
    pub eway_bill_number: Option<String>,
    pub eway_bill_date: Option<NaiveDate>,
    pub dc_number: Option<String>,
    pub subtotal: Decimal,
    pub total_cgst: Decimal,
    pub total_sgst: Decimal,
    pub total_igst: Decimal,
    pub total_tax: Decimal,
    pub grand_total: Decimal,
    pub notes: Option<String>,
    pub terms_and_conditions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// Invoice header joined with the client name, for listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InvoiceSummary {
    pub id: i64,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub client_id: i64,
    pub client_name: String,
    pub status: String,
    pub subtotal: Decimal,
    pub total_tax: Decimal,
    pub grand_total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One requested line of a new invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItemRequest {
    pub item_id: i64,
    pub quantity: Decimal,
}

fn default_true() -> bool {
    true
}

/// Inbound payload for `POST /api/invoices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvoiceRequest {
    pub client_id: i64,
    pub invoice_date: NaiveDate,
    pub invoice_items: Vec<InvoiceItemRequest>,
    #[serde(default = "default_true")]
    pub shipping_same_as_billing: bool,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub shipping_state: Option<String>,
    #[serde(default)]
    pub eway_bill_number: Option<String>,
    #[serde(default)]
    pub eway_bill_date: Option<NaiveDate>,
    #[serde(default)]
    pub dc_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub terms_and_conditions: Option<String>,
}

/// Creation result: surrogate id plus the allocated number.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedInvoice {
    pub invoice_id: i64,
    pub invoice_number: String,
}

/// Filter parameters for listing invoices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListInvoicesFilter {
    pub client_id: Option<i64>,
    pub search: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
