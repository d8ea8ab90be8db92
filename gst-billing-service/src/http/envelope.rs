//! Standard response envelope: `{success, message, timestamp, data?}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Success envelope with a payload.
pub fn success<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    (
        status,
        Json(Envelope {
            success: true,
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            data: Some(data),
        }),
    )
        .into_response()
}

/// Success envelope without a payload.
pub fn success_message(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(Envelope::<()> {
            success: true,
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            data: None,
        }),
    )
        .into_response()
}
