use axum::routing::{get, post};
use axum::Router;

use crate::handlers::hardware;
use crate::state::AppState;

/// Routes mounted at `/hardware`.
///
/// ```text
/// POST /report   -> report
/// GET  /list     -> list
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/report", post(hardware::report))
        .route("/list", get(hardware::list))
}
