//! Handlers for hardware inventory reports.
//!
//! Inventory is stored for display only and never evaluated for health.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use healthwatch_core::error::CoreError;
use healthwatch_db::models::hardware::{HardwareReport, UpsertHardwareReport};
use healthwatch_db::repositories::HardwareReportRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/hardware/report
pub async fn report(
    State(state): State<AppState>,
    Json(input): Json<UpsertHardwareReport>,
) -> AppResult<Json<DataResponse<HardwareReport>>> {
    if input.hostname.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "hostname is required".to_string(),
        )));
    }

    let stored = HardwareReportRepo::upsert(&state.pool, &input, Utc::now()).await?;
    tracing::debug!(hostname = %stored.hostname, "Hardware report stored");
    Ok(Json(DataResponse { data: stored }))
}

/// GET /api/v1/hardware/list
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<HardwareReport>>>> {
    let reports = HardwareReportRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: reports }))
}
