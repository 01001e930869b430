use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// Health check endpoint for Docker/K8s liveness probes.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "gemini-relay",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness check endpoint for K8s readiness probes. The service holds no
/// connections or state of its own, so readiness mirrors liveness.
pub async fn readiness_check() -> StatusCode {
    StatusCode::OK
}
