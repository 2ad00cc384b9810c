use axum::{Json, response::IntoResponse};
use http::StatusCode;

/// Liveness probe; answers as soon as the engine pool is built
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}
