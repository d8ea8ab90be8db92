//! Catalog item endpoints.

use crate::http::clients::ListQuery;
use crate::http::{envelope, validation, AppState};
use crate::models::{CreateItem, UpdateItem};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde_json::json;
use service_core::error::AppError;

pub async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<CreateItem>,
) -> Result<Response, AppError> {
    validation::validate_create_item(&input)?;

    let item = state.db.create_item(&input).await?;

    state
        .audit
        .record("CREATE", "ITEM", item.id, None, Some(json!(item)));

    Ok(envelope::success(
        StatusCode::CREATED,
        "Item created",
        json!({ "id": item.id }),
    ))
}

pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);
    let items = state
        .db
        .list_items(query.search.as_deref(), limit, offset)
        .await?;

    Ok(envelope::success(StatusCode::OK, "Items retrieved", items))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<Response, AppError> {
    let item = state
        .db
        .get_item(item_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Item {} not found", item_id)))?;

    Ok(envelope::success(StatusCode::OK, "Item retrieved", item))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Json(input): Json<UpdateItem>,
) -> Result<Response, AppError> {
    validation::validate_update_item(&input)?;

    let previous = state
        .db
        .get_item(item_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Item {} not found", item_id)))?;

    let item = state
        .db
        .update_item(item_id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Item {} not found", item_id)))?;

    state.audit.record(
        "UPDATE",
        "ITEM",
        item.id,
        Some(json!(previous)),
        Some(json!(item)),
    );

    Ok(envelope::success(StatusCode::OK, "Item updated", item))
}

pub async fn deactivate_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<Response, AppError> {
    let removed = state.db.deactivate_item(item_id).await?;
    if !removed {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "Item {} not found",
            item_id
        )));
    }

    state.audit.record(
        "DELETE",
        "ITEM",
        item_id,
        None,
        Some(json!({ "is_active": false })),
    );

    Ok(envelope::success_message("Item deactivated"))
}
