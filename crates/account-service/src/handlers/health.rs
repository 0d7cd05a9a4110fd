//! Liveness and readiness probes.
//!
//! `/health` answers if the process is running at all; `/ready` answers
//! whether traffic can be served, which for this service means the
//! database responds. The media service is deliberately not probed:
//! it is contacted on demand and an outage there surfaces as 502s on
//! the affected upload requests, not as unreadiness.

use crate::models::ReadinessResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

/// Handler for GET /health
///
/// No dependency checks: a failure here means the process is hung.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Handler for GET /ready
///
/// Runs a trivial query against the pool. 200 when the database
/// answers, 503 otherwise. The body names the failing dependency
/// generically; the underlying error goes to the log, not the wire.
#[tracing::instrument(skip_all, name = "acct.health.readiness")]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").fetch_one(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready",
                database: Some("healthy"),
                error: None,
            }),
        ),
        Err(e) => {
            tracing::warn!("Not ready: database probe failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    status: "not_ready",
                    database: Some("unhealthy"),
                    error: Some("Database connectivity check failed".to_string()),
                }),
            )
        }
    }
}
