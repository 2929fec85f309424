use std::sync::Arc;

use healthwatch_core::access::AccessPolicy;
use healthwatch_core::health::RuleSet;
use healthwatch_core::rate_limit::CommandRateLimiter;
use healthwatch_db::SqliteStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: healthwatch_db::DbPool,
    /// Store adapter shared with the scheduler.
    pub store: Arc<SqliteStore>,
    pub config: Arc<ServerConfig>,
    /// Rules used to derive snapshot health on read.
    pub rules: RuleSet,
    /// Owners allowed to manage targets.
    pub access: Arc<AccessPolicy>,
    /// Per-owner cool-down on target commands.
    pub rate_limiter: Arc<CommandRateLimiter>,
}
