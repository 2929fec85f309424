//! Route definitions for metric ingestion and snapshot queries.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{ingest, snapshots};
use crate::state::AppState;

/// ```text
/// POST /gpu/report     -> gpu_report
/// GET  /gpu/list       -> list_gpus
/// POST /host/report    -> host_report
/// GET  /host/list      -> list_hosts
/// GET  /snapshots      -> list_all
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/gpu/report", post(ingest::gpu_report))
        .route("/gpu/list", get(snapshots::list_gpus))
        .route("/host/report", post(ingest::host_report))
        .route("/host/list", get(snapshots::list_hosts))
        .route("/snapshots", get(snapshots::list_all))
}
