//! Handlers for owner-managed probe targets.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use healthwatch_core::store::TargetStore;
use healthwatch_core::target::{add_target, remove_target, MonitorTarget};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::owner::{CommandOwner, Owner};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AddTargetRequest {
    /// `ip:port`, IPv6 hosts bracketed.
    pub address: String,
}

/// A target with its status rendered for display.
#[derive(Debug, Serialize)]
pub struct TargetView {
    #[serde(flatten)]
    pub target: MonitorTarget,
    /// `UP`, `DOWN` or `UNKNOWN`.
    pub status: &'static str,
}

impl From<MonitorTarget> for TargetView {
    fn from(target: MonitorTarget) -> Self {
        let status = target.last_state.label();
        Self { target, status }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/targets
///
/// Lists the caller's targets. Not subject to the command cool-down.
pub async fn list_targets(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
) -> AppResult<Json<DataResponse<Vec<TargetView>>>> {
    let targets = state.store.list_targets_for_owner(owner_id).await?;
    Ok(Json(DataResponse {
        data: targets.into_iter().map(TargetView::from).collect(),
    }))
}

/// POST /api/v1/targets
pub async fn create_target(
    State(state): State<AppState>,
    CommandOwner(owner_id): CommandOwner,
    Json(input): Json<AddTargetRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TargetView>>)> {
    let target = add_target(state.store.as_ref(), owner_id, &input.address).await?;
    tracing::info!(
        target_id = target.id,
        owner_id,
        address = %target.address,
        "Target added"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: target.into(),
        }),
    ))
}

/// DELETE /api/v1/targets/{address}
pub async fn delete_target(
    State(state): State<AppState>,
    CommandOwner(owner_id): CommandOwner,
    Path(address): Path<String>,
) -> AppResult<StatusCode> {
    remove_target(state.store.as_ref(), owner_id, &address).await?;
    tracing::info!(owner_id, address = %address, "Target removed");
    Ok(StatusCode::NO_CONTENT)
}
