pub mod hardware;
pub mod health;
pub mod metrics;
pub mod targets;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /gpu/report                   ingest GPU reports (POST, array)
/// /gpu/list                     GPU snapshots with derived health
/// /host/report                  ingest host reports (POST, one or many)
/// /host/list                    host snapshots with derived health
/// /snapshots                    every snapshot with derived health
///
/// /targets                      list (x-owner-id), add (POST)
/// /targets/{address}            remove (DELETE)
///
/// /hardware/report              upsert inventory (POST)
/// /hardware/list                list inventory
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(metrics::router())
        .nest("/targets", targets::router())
        .nest("/hardware", hardware::router())
}
