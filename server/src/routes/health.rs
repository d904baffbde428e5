//! Liveness endpoints.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Root liveness message.
#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Create health routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}

/// GET / - bare liveness check.
async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Mend Sync Engine is running".to_string(),
    })
}

/// GET /health - status and build version.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
