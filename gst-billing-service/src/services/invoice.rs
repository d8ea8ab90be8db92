//! Invoice creation coordinator.
//!
//! Orchestrates one `POST /api/invoices` call: load the client, the seller
//! profile and every referenced catalog item, compute the GST split,
//! resolve shipping, allocate an invoice number, and persist the header
//! plus all lines as one transaction. All lookups run inside that
//! transaction, before any write, so a missing item can never leave a
//! partially written invoice. A uniqueness conflict on the allocated
//! number rolls the whole attempt back (including the counter increment)
//! and retries with a fresh number, a bounded number of times.

use crate::models::{Client, Company, CreateInvoiceRequest, CreatedInvoice, Item};
use crate::services::metrics::{ERRORS_TOTAL, INVOICES_TOTAL, INVOICE_AMOUNT_TOTAL};
use crate::services::{sequence, tax, AuditSink, Database};
use rust_decimal::prelude::ToPrimitive;
use service_core::error::AppError;
use serde_json::json;
use sqlx::PgConnection;
use tracing::{info, instrument, warn};

/// Attempts at allocating a non-colliding invoice number before giving up.
const MAX_NUMBER_ATTEMPTS: u32 = 3;

/// Shipping destination resolved for an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingDetails {
    pub address: String,
    pub state: String,
}

/// Explicit merge of the caller's shipping override with the client's
/// billing details; omitted override fields fall back to the client.
pub fn resolve_shipping(client: &Client, request: &CreateInvoiceRequest) -> ShippingDetails {
    if request.shipping_same_as_billing {
        return ShippingDetails {
            address: client.client_address.clone(),
            state: client.client_state.clone(),
        };
    }
    ShippingDetails {
        address: request
            .shipping_address
            .clone()
            .unwrap_or_else(|| client.client_address.clone()),
        state: request
            .shipping_state
            .clone()
            .unwrap_or_else(|| client.client_state.clone()),
    }
}

async fn load_client(conn: &mut PgConnection, client_id: i64) -> Result<Client, AppError> {
    let client = sqlx::query_as::<_, Client>(
        r#"
        SELECT id, client_name, client_address, client_state, client_gst_number,
            client_mobile, client_email, bank_name, bank_account_number, bank_ifsc_code,
            is_active, created_at
        FROM clients
        WHERE id = $1
        "#,
    )
    .bind(client_id)
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load client: {}", e)))?;

    match client {
        Some(c) if c.is_active => Ok(c),
        _ => Err(AppError::NotFound(anyhow::anyhow!(
            "Client {} not found",
            client_id
        ))),
    }
}

async fn load_company(conn: &mut PgConnection) -> Result<Company, AppError> {
    let company = sqlx::query_as::<_, Company>(
        r#"
        SELECT id, company_name, company_address, company_state, company_gst_number,
            company_email, company_phone, bank_name, bank_account_number, bank_ifsc_code,
            upi_id, updated_at
        FROM company
        WHERE id = 1
        "#,
    )
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load company: {}", e)))?;

    company.ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!(
            "Company profile is not configured; cannot issue invoices"
        ))
    })
}

async fn load_item(conn: &mut PgConnection, item_id: i64) -> Result<Item, AppError> {
    let item = sqlx::query_as::<_, Item>(
        r#"
        SELECT id, item_name, description, hsn_code, unit, cgst_rate, sgst_rate,
            igst_rate, price, is_active, created_at
        FROM items
        WHERE id = $1
        "#,
    )
    .bind(item_id)
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load item: {}", e)))?;

    item.ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Item {} not found", item_id)))
}

/// Create an invoice. Returns the surrogate id and the allocated number.
#[instrument(skip(db, audit, request), fields(client_id = %request.client_id))]
pub async fn create_invoice(
    db: &Database,
    audit: &AuditSink,
    request: &CreateInvoiceRequest,
) -> Result<CreatedInvoice, AppError> {
    if request.invoice_items.is_empty() {
        return Err(AppError::Validation(
            "Invoice must contain at least one line item".to_string(),
        ));
    }

    for attempt in 1..=MAX_NUMBER_ATTEMPTS {
        let mut tx = db.pool().begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        // Load phase: every lookup is a fresh read within this transaction
        // and completes before the first write.
        let client = load_client(&mut *tx, request.client_id).await?;
        let company = load_company(&mut *tx).await?;

        let mut items = Vec::with_capacity(request.invoice_items.len());
        for line in &request.invoice_items {
            items.push(load_item(&mut *tx, line.item_id).await?);
        }

        let tax_inputs: Vec<tax::TaxLineInput> = request
            .invoice_items
            .iter()
            .zip(&items)
            .map(|(line, item)| tax::TaxLineInput {
                quantity: line.quantity,
                unit_price: item.price,
                cgst_rate: item.cgst_rate,
                sgst_rate: item.sgst_rate,
                igst_rate: item.igst_rate,
            })
            .collect();

        let (computed, totals) =
            tax::compute(&client.client_state, &company.company_state, &tax_inputs)?;
        let shipping = resolve_shipping(&client, request);

        let invoice_number = sequence::allocate(&mut *tx, request.invoice_date).await?;

        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO invoices (
                invoice_number, invoice_date, client_id, status,
                shipping_address, shipping_state, eway_bill_number, eway_bill_date, dc_number,
                subtotal, total_cgst, total_sgst, total_igst, total_tax, grand_total,
                notes, terms_and_conditions
            )
            VALUES ($1, $2, $3, 'finalized', $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id
            "#,
        )
        .bind(&invoice_number)
        .bind(request.invoice_date)
        .bind(client.id)
        .bind(&shipping.address)
        .bind(&shipping.state)
        .bind(&request.eway_bill_number)
        .bind(request.eway_bill_date)
        .bind(&request.dc_number)
        .bind(totals.subtotal)
        .bind(totals.total_cgst)
        .bind(totals.total_sgst)
        .bind(totals.total_igst)
        .bind(totals.total_tax)
        .bind(totals.grand_total)
        .bind(&request.notes)
        .bind(&request.terms_and_conditions)
        .fetch_one(&mut *tx)
        .await;

        let invoice_id = match inserted {
            Ok(id) => id,
            Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
                // Another writer took this number; the rollback also undoes
                // the counter increment, so the retry reallocates cleanly.
                tx.rollback().await.ok();
                warn!(
                    invoice_number = %invoice_number,
                    attempt = attempt,
                    "Invoice number collision, retrying"
                );
                ERRORS_TOTAL.with_label_values(&["number_collision"]).inc();
                continue;
            }
            Err(e) => {
                tx.rollback().await.ok();
                return Err(AppError::DatabaseError(anyhow::anyhow!(
                    "Failed to insert invoice: {}",
                    e
                )));
            }
        };

        for (line, (item, computed_line)) in request
            .invoice_items
            .iter()
            .zip(items.iter().zip(&computed))
        {
            let result = sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    invoice_id, item_id, item_name, description, hsn_code,
                    quantity, unit_price, taxable_value,
                    cgst_rate, cgst_amount, sgst_rate, sgst_amount, igst_rate, igst_amount,
                    line_total, gst_type
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
                "#,
            )
            .bind(invoice_id)
            .bind(item.id)
            .bind(&item.item_name)
            .bind(&item.description)
            .bind(&item.hsn_code)
            .bind(line.quantity)
            .bind(item.price)
            .bind(computed_line.taxable_value)
            .bind(computed_line.cgst_rate)
            .bind(computed_line.cgst_amount)
            .bind(computed_line.sgst_rate)
            .bind(computed_line.sgst_amount)
            .bind(computed_line.igst_rate)
            .bind(computed_line.igst_amount)
            .bind(computed_line.line_total)
            .bind(computed_line.gst_type.as_str())
            .execute(&mut *tx)
            .await;

            if let Err(e) = result {
                tx.rollback().await.ok();
                return Err(AppError::DatabaseError(anyhow::anyhow!(
                    "Failed to insert invoice line: {}",
                    e
                )));
            }
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit invoice: {}", e))
        })?;

        info!(
            invoice_id = invoice_id,
            invoice_number = %invoice_number,
            grand_total = %totals.grand_total,
            "Invoice created"
        );

        let gst_type = computed
            .first()
            .map(|l| l.gst_type.as_str())
            .unwrap_or("unknown");
        INVOICES_TOTAL.with_label_values(&["created"]).inc();
        INVOICE_AMOUNT_TOTAL
            .with_label_values(&[gst_type])
            .inc_by(totals.grand_total.to_f64().unwrap_or(0.0));

        audit.record(
            "CREATE",
            "INVOICE",
            invoice_id,
            None,
            Some(json!({
                "invoice_number": invoice_number,
                "client_id": client.id,
                "invoice_date": request.invoice_date,
                "subtotal": totals.subtotal,
                "total_tax": totals.total_tax,
                "grand_total": totals.grand_total,
                "line_count": request.invoice_items.len(),
            })),
        );

        return Ok(CreatedInvoice {
            invoice_id,
            invoice_number,
        });
    }

    ERRORS_TOTAL
        .with_label_values(&["number_exhausted"])
        .inc();
    Err(AppError::Conflict(anyhow::anyhow!(
        "Could not allocate a unique invoice number after {} attempts",
        MAX_NUMBER_ATTEMPTS
    )))
}
