//! Invoice endpoints: creation, listing, retrieval and cancellation.

use crate::http::{envelope, AppState};
use crate::models::{CreateInvoiceRequest, ListInvoicesFilter};
use crate::services::invoice;
use crate::services::metrics::INVOICES_TOTAL;
use crate::services::CancelOutcome;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde_json::json;
use service_core::error::AppError;

pub async fn create_invoice(
    State(state): State<AppState>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<Response, AppError> {
    let created = invoice::create_invoice(&state.db, &state.audit, &request).await?;

    Ok(envelope::success(
        StatusCode::CREATED,
        "Invoice created",
        created,
    ))
}

pub async fn list_invoices(
    State(state): State<AppState>,
    Query(filter): Query<ListInvoicesFilter>,
) -> Result<Response, AppError> {
    let invoices = state.db.list_invoices(&filter).await?;

    Ok(envelope::success(
        StatusCode::OK,
        "Invoices retrieved",
        invoices,
    ))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<i64>,
) -> Result<Response, AppError> {
    let header = state
        .db
        .get_invoice(invoice_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice {} not found", invoice_id)))?;
    let lines = state.db.get_invoice_lines(invoice_id).await?;

    Ok(envelope::success(
        StatusCode::OK,
        "Invoice retrieved",
        json!({ "invoice": header, "items": lines }),
    ))
}

pub async fn cancel_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<i64>,
) -> Result<Response, AppError> {
    let outcome = state
        .db
        .cancel_invoice(invoice_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice {} not found", invoice_id)))?;

    match outcome {
        CancelOutcome::Cancelled => {
            INVOICES_TOTAL.with_label_values(&["cancelled"]).inc();
            state.audit.record(
                "CANCEL",
                "INVOICE",
                invoice_id,
                Some(json!({ "status": "finalized" })),
                Some(json!({ "status": "cancelled" })),
            );
            Ok(envelope::success_message("Invoice cancelled"))
        }
        CancelOutcome::AlreadyCancelled => {
            Ok(envelope::success_message("Invoice already cancelled"))
        }
    }
}
