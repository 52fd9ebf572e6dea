/*
 * Responsibility
 * - GET /health (liveness check for the hosting platform)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::api::v1::handlers::token_issuance_start::API_VERSION;

pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"status": "ok", "version": API_VERSION})),
    )
}
