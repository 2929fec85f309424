//! Shared response envelope types for API handlers.
//!
//! List and mutation responses use a `{ "data": ... }` envelope. The
//! liveness and health summary endpoints return their bodies bare.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
