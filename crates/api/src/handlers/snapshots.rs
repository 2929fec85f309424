//! Read-side snapshot handlers.
//!
//! Every snapshot is returned with its health derived at request time, so
//! the answer reflects staleness even when no agent has reported since.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use healthwatch_core::health::{EntityAssessment, RuleSet};
use healthwatch_core::snapshot::{EntityKind, MetricSnapshot};
use healthwatch_core::state::MonitorState;
use healthwatch_core::store::MetricStore;
use healthwatch_core::types::Timestamp;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// A stored snapshot plus its derived health.
#[derive(Debug, Serialize)]
pub struct SnapshotView {
    #[serde(flatten)]
    pub snapshot: MetricSnapshot,
    pub age_seconds: i64,
    pub stale: bool,
    pub issues: Vec<String>,
    pub health: MonitorState,
}

impl SnapshotView {
    pub fn derive(snapshot: MetricSnapshot, rules: &RuleSet, now: Timestamp) -> Self {
        let assessment = EntityAssessment::assess(&snapshot, rules, now);
        Self {
            age_seconds: (now - snapshot.collected_at).num_seconds().max(0),
            stale: rules.is_stale(&snapshot, now),
            issues: assessment.issues,
            health: assessment.state,
            snapshot,
        }
    }
}

async fn list_views(state: &AppState, kind: Option<EntityKind>) -> AppResult<Vec<SnapshotView>> {
    let snapshots = state.store.list_snapshots(kind).await?;
    let now = Utc::now();
    Ok(snapshots
        .into_iter()
        .map(|s| SnapshotView::derive(s, &state.rules, now))
        .collect())
}

/// GET /api/v1/gpu/list
pub async fn list_gpus(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<SnapshotView>>>> {
    let data = list_views(&state, Some(EntityKind::Gpu)).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/host/list
pub async fn list_hosts(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<SnapshotView>>>> {
    let data = list_views(&state, Some(EntityKind::Host)).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/snapshots
pub async fn list_all(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<SnapshotView>>>> {
    let data = list_views(&state, None).await?;
    Ok(Json(DataResponse { data }))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use healthwatch_core::snapshot::{MetricMap, MetricValue};

    use super::*;

    #[test]
    fn old_snapshot_is_flagged_stale() {
        let now = Utc::now();
        let metrics = MetricMap::from([
            ("temperature_c".to_string(), MetricValue::Integer(50)),
            ("process_count".to_string(), MetricValue::Integer(1)),
        ]);
        let snap = MetricSnapshot::new(
            EntityKind::Gpu,
            "gpu-0",
            metrics,
            now - Duration::minutes(10),
        );

        let view = SnapshotView::derive(snap, &RuleSet::default(), now);
        assert_eq!(view.age_seconds, 600);
        assert!(view.stale);
        assert_eq!(view.issues, vec!["stale data".to_string()]);
        assert_eq!(view.health, MonitorState::Unhealthy);
    }
}
