//! Health check handlers
//!
//! Liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use counsel_service::{HealthResponse, ReadinessResponse};
use futures::future::join_all;
use tracing::warn;

use crate::state::AppState;

/// Basic health check (liveness probe)
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Readiness check across every configured backend
///
/// GET /health/ready
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let checks = join_all(state.probes().iter().map(|probe| async move {
        let healthy = match probe.check().await {
            Ok(()) => true,
            Err(e) => {
                warn!(probe = probe.name(), error = %e, "Readiness probe failed");
                false
            }
        };
        (probe.name(), healthy)
    }))
    .await;

    let response = ReadinessResponse::from_checks(checks);
    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
