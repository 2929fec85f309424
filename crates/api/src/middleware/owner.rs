//! Owner identity extractors for target management handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use healthwatch_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the numeric id of the calling owner (a chat id).
pub const OWNER_HEADER: &str = "x-owner-id";

fn owner_id(parts: &Parts) -> Result<DbId, AppError> {
    let raw = parts
        .headers
        .get(OWNER_HEADER)
        .ok_or_else(|| AppError::BadRequest(format!("Missing {OWNER_HEADER} header")))?;

    raw.to_str()
        .ok()
        .and_then(|v| v.trim().parse::<DbId>().ok())
        .ok_or_else(|| AppError::BadRequest(format!("{OWNER_HEADER} must be an integer id")))
}

/// An owner admitted by the access policy.
///
/// ```ignore
/// async fn list(Owner(owner_id): Owner) -> AppResult<Json<()>> { ... }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Owner(pub DbId);

impl FromRequestParts<AppState> for Owner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = owner_id(parts)?;
        state.access.authorize(id)?;
        Ok(Owner(id))
    }
}

/// An admitted owner whose command is outside the cool-down window.
///
/// Extracting this consumes the owner's window, so use it only on
/// mutating endpoints.
#[derive(Debug, Clone, Copy)]
pub struct CommandOwner(pub DbId);

impl FromRequestParts<AppState> for CommandOwner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Owner(id) = Owner::from_request_parts(parts, state).await?;
        if let Err(e) = state.rate_limiter.check(id) {
            tracing::debug!(owner_id = id, "Target command rejected by cool-down");
            return Err(e.into());
        }
        Ok(CommandOwner(id))
    }
}
