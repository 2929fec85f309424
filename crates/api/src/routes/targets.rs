use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::targets;
use crate::state::AppState;

/// Routes mounted at `/targets`.
///
/// Every route needs the `x-owner-id` header; mutations are rate-limited.
///
/// ```text
/// GET    /              -> list_targets
/// POST   /              -> create_target
/// DELETE /{address}     -> delete_target
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(targets::list_targets).post(targets::create_target),
        )
        .route("/{address}", delete(targets::delete_target))
}
