//! HTTP surface: routing, shared state and the response envelope.

pub mod clients;
pub mod company;
pub mod envelope;
pub mod invoices;
pub mod items;
pub mod validation;

use crate::services::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION};
use crate::services::{AuditSink, Database};
use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub audit: AuditSink,
}

/// Records request counts and latencies per method and route template.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let method = request.method().to_string();

    let timer = HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path])
        .start_timer();
    let response = next.run(request).await;
    timer.observe_duration();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, response.status().as_str()])
        .inc();

    response
}

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/company", get(company::get_company))
        .route("/api/company", put(company::update_company))
        .route("/api/clients", post(clients::create_client))
        .route("/api/clients", get(clients::list_clients))
        .route("/api/clients/:id", get(clients::get_client))
        .route("/api/clients/:id", put(clients::update_client))
        .route("/api/clients/:id", delete(clients::deactivate_client))
        .route("/api/items", post(items::create_item))
        .route("/api/items", get(items::list_items))
        .route("/api/items/:id", get(items::get_item))
        .route("/api/items/:id", put(items::update_item))
        .route("/api/items/:id", delete(items::deactivate_item))
        .route("/api/invoices", post(invoices::create_invoice))
        .route("/api/invoices", get(invoices::list_invoices))
        .route("/api/invoices/:id", get(invoices::get_invoice))
        .route("/api/invoices/:id", delete(invoices::cancel_invoice))
        .with_state(state)
}
