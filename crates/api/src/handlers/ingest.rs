//! Handlers for GPU and host metric ingestion.
//!
//! Agents push their latest readings; each entity's snapshot is replaced
//! wholesale and stamped with the server's receipt time.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use healthwatch_core::snapshot::{GpuReport, HostReport, MetricSnapshot};
use healthwatch_core::store::MetricStore;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Host agents send either a single report or a batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum HostReportBody {
    Many(Vec<HostReport>),
    One(HostReport),
}

impl HostReportBody {
    fn into_reports(self) -> Vec<HostReport> {
        match self {
            HostReportBody::Many(reports) => reports,
            HostReportBody::One(report) => vec![report],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    /// Number of snapshots written.
    pub accepted: usize,
}

fn require_identity(snapshots: &[MetricSnapshot]) -> AppResult<()> {
    if snapshots.iter().any(|s| s.entity_id.trim().is_empty()) {
        return Err(AppError::BadRequest(
            "every report needs a non-empty name".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/gpu/report
pub async fn gpu_report(
    State(state): State<AppState>,
    Json(reports): Json<Vec<GpuReport>>,
) -> AppResult<Json<DataResponse<IngestResponse>>> {
    let now = Utc::now();
    let snapshots: Vec<MetricSnapshot> = reports
        .into_iter()
        .map(|r| r.into_snapshot(now))
        .collect();
    require_identity(&snapshots)?;

    state.store.upsert_snapshots(&snapshots).await?;
    tracing::debug!(count = snapshots.len(), "GPU reports stored");

    Ok(Json(DataResponse {
        data: IngestResponse {
            accepted: snapshots.len(),
        },
    }))
}

/// POST /api/v1/host/report
pub async fn host_report(
    State(state): State<AppState>,
    Json(body): Json<HostReportBody>,
) -> AppResult<Json<DataResponse<IngestResponse>>> {
    let now = Utc::now();
    let snapshots: Vec<MetricSnapshot> = body
        .into_reports()
        .into_iter()
        .map(|r| r.into_snapshot(now))
        .collect();
    require_identity(&snapshots)?;

    state.store.upsert_snapshots(&snapshots).await?;
    tracing::debug!(count = snapshots.len(), "Host reports stored");

    Ok(Json(DataResponse {
        data: IngestResponse {
            accepted: snapshots.len(),
        },
    }))
}
