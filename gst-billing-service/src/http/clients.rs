//! Client registry endpoints.

use crate::http::{envelope, validation, AppState};
use crate::models::{CreateClient, UpdateClient};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(input): Json<CreateClient>,
) -> Result<Response, AppError> {
    validation::validate_create_client(&input)?;

    let client = state.db.create_client(&input).await?;

    state
        .audit
        .record("CREATE", "CLIENT", client.id, None, Some(json!(client)));

    Ok(envelope::success(
        StatusCode::CREATED,
        "Client created",
        json!({ "id": client.id }),
    ))
}

pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);
    let clients = state
        .db
        .list_clients(query.search.as_deref(), limit, offset)
        .await?;

    Ok(envelope::success(
        StatusCode::OK,
        "Clients retrieved",
        clients,
    ))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
) -> Result<Response, AppError> {
    let client = state
        .db
        .get_client(client_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client {} not found", client_id)))?;

    Ok(envelope::success(StatusCode::OK, "Client retrieved", client))
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
    Json(input): Json<UpdateClient>,
) -> Result<Response, AppError> {
    validation::validate_update_client(&input)?;

    let previous = state
        .db
        .get_client(client_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client {} not found", client_id)))?;

    let client = state
        .db
        .update_client(client_id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client {} not found", client_id)))?;

    state.audit.record(
        "UPDATE",
        "CLIENT",
        client.id,
        Some(json!(previous)),
        Some(json!(client)),
    );

    Ok(envelope::success(StatusCode::OK, "Client updated", client))
}

pub async fn deactivate_client(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
) -> Result<Response, AppError> {
    let removed = state.db.deactivate_client(client_id).await?;
    if !removed {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "Client {} not found",
            client_id
        )));
    }

    state.audit.record(
        "DELETE",
        "CLIENT",
        client_id,
        None,
        Some(json!({ "is_active": false })),
    );

    Ok(envelope::success_message("Client deactivated"))
}
