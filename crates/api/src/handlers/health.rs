//! Liveness and aggregate health handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use healthwatch_core::health::{summarize, HealthSummary};
use healthwatch_core::store::MetricStore;
use serde::Serialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Liveness response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process is serving requests.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
}

/// GET /health
pub async fn liveness(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = healthwatch_db::health_check(&state.pool).await.is_ok();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

/// GET /healthcheck
///
/// Evaluates every stored snapshot. Responds 200 when nothing is wrong and
/// 503 with the labelled issue list otherwise.
pub async fn healthcheck(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<HealthSummary>)> {
    let snapshots = state.store.list_snapshots(None).await?;
    let summary = summarize(&snapshots, &state.rules, Utc::now());

    let status = if summary.is_healthy() {
        StatusCode::OK
    } else {
        tracing::debug!(issues = summary.issues.len(), "Health summary is unhealthy");
        StatusCode::SERVICE_UNAVAILABLE
    };
    Ok((status, Json(summary)))
}
