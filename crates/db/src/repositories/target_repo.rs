//! Repository for the `monitor_targets` table.

use healthwatch_core::state::MonitorState;
use healthwatch_core::target::MonitorTarget;
use healthwatch_core::types::{DbId, Timestamp};
use sqlx::SqlitePool;

use crate::models::target::TargetRow;

/// Column list for `monitor_targets` SELECT queries.
const COLUMNS: &str = "id, owner_id, address, last_state, created_at, updated_at";

/// Provides query operations for monitored targets.
pub struct TargetRepo;

impl TargetRepo {
    /// Insert a new target in the `unknown` state.
    ///
    /// Fails with a unique violation when the owner already has `address`.
    pub async fn create(
        pool: &SqlitePool,
        owner_id: DbId,
        address: &str,
        now: Timestamp,
    ) -> Result<MonitorTarget, sqlx::Error> {
        let query = format!(
            "INSERT INTO monitor_targets (owner_id, address, last_state, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, TargetRow>(&query)
            .bind(owner_id)
            .bind(address)
            .bind(MonitorState::Unknown.as_str())
            .bind(now)
            .bind(now)
            .fetch_one(pool)
            .await?;
        row.try_into()
    }

    /// List every target, ordered by id.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<MonitorTarget>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM monitor_targets ORDER BY id");
        sqlx::query_as::<_, TargetRow>(&query)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(MonitorTarget::try_from)
            .collect()
    }

    /// List the targets owned by `owner_id`, ordered by id.
    pub async fn list_by_owner(
        pool: &SqlitePool,
        owner_id: DbId,
    ) -> Result<Vec<MonitorTarget>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM monitor_targets WHERE owner_id = ? ORDER BY id");
        sqlx::query_as::<_, TargetRow>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(MonitorTarget::try_from)
            .collect()
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<MonitorTarget>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM monitor_targets WHERE id = ?");
        sqlx::query_as::<_, TargetRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(MonitorTarget::try_from)
            .transpose()
    }

    /// Record the latest probe state. A no-op if the target was deleted.
    pub async fn update_state(
        pool: &SqlitePool,
        id: DbId,
        state: MonitorState,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE monitor_targets SET last_state = ?, updated_at = ? WHERE id = ?")
            .bind(state.as_str())
            .bind(now)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Delete the owner's target. Returns `true` if a row was removed.
    pub async fn delete(
        pool: &SqlitePool,
        owner_id: DbId,
        address: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM monitor_targets WHERE owner_id = ? AND address = ?")
            .bind(owner_id)
            .bind(address)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
