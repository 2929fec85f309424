use axum::routing::get;
use axum::Router;

use crate::handlers::health;
use crate::state::AppState;

/// Mount health routes (intended for root-level, NOT under `/api/v1`).
///
/// ```text
/// GET /health        -> liveness
/// GET /healthcheck   -> healthcheck (200 healthy, 503 unhealthy)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::liveness))
        .route("/healthcheck", get(health::healthcheck))
}
