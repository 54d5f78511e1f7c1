//! Health check handler

use axum::Json;

use crate::dto::HealthResponse;

/// Liveness check; does not touch dependencies
#[utoipa::path(
    get,
    path = "/api/healthz",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
