//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use core_kernel::HealthCheckResult;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub version: String,
    pub store: HealthCheckResult,
}

/// Liveness
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness, including the fee store
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let store = state.health.health_check().await;
    let (code, status) = if store.is_available() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    (
        code,
        Json(ReadinessResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store,
        }),
    )
}
