//! Seller company profile endpoints.

use crate::http::{envelope, validation, AppState};
use crate::models::UpdateCompany;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde_json::json;
use service_core::error::AppError;

pub async fn get_company(State(state): State<AppState>) -> Result<Response, AppError> {
    let company = state
        .db
        .get_company()
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Company profile not configured")))?;

    Ok(envelope::success(
        StatusCode::OK,
        "Company profile retrieved",
        company,
    ))
}

pub async fn update_company(
    State(state): State<AppState>,
    Json(input): Json<UpdateCompany>,
) -> Result<Response, AppError> {
    validation::validate_company(&input)?;

    let previous = state.db.get_company().await?;
    let company = state.db.upsert_company(&input).await?;

    state.audit.record(
        "UPDATE",
        "COMPANY",
        company.id,
        previous.map(|c| json!(c)),
        Some(json!(company)),
    );

    Ok(envelope::success(
        StatusCode::OK,
        "Company profile updated",
        company,
    ))
}
