//! Invoice line model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One priced, taxed row of an invoice. Item name, HSN code, rates and
/// price are snapshots taken when the invoice was created; the row is
/// immutable afterwards and always written in the same transaction as its
/// parent header.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InvoiceLine {
    pub id: i64,
    pub invoice_id: i64,
    pub item_id: i64,
    pub item_name: String,
    pub description: Option<String>,
    pub hsn_code: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub taxable_value: Decimal,
    pub cgst_rate: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_rate: Decimal,
    pub sgst_amount: Decimal,
    pub igst_rate: Decimal,
    pub igst_amount: Decimal,
    pub line_total: Decimal,
    pub gst_type: String,
    pub created_at: DateTime<Utc>,
}
