//! Repository for the `entity_health` table.

use healthwatch_core::snapshot::EntityKey;
use healthwatch_core::state::MonitorState;
use healthwatch_core::types::Timestamp;
use sqlx::SqlitePool;

use crate::models::entity_health::EntityHealthRow;

/// Provides query operations for reconciled entity health.
pub struct EntityHealthRepo;

impl EntityHealthRepo {
    pub async fn find(
        pool: &SqlitePool,
        key: &EntityKey,
    ) -> Result<Option<EntityHealthRow>, sqlx::Error> {
        sqlx::query_as::<_, EntityHealthRow>(
            "SELECT entity_kind, entity_id, state, updated_at FROM entity_health \
             WHERE entity_kind = ? AND entity_id = ?",
        )
        .bind(key.kind.as_str())
        .bind(&key.entity_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn upsert(
        pool: &SqlitePool,
        key: &EntityKey,
        state: MonitorState,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO entity_health (entity_kind, entity_id, state, updated_at) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT (entity_kind, entity_id) DO UPDATE SET \
                 state = excluded.state, \
                 updated_at = excluded.updated_at",
        )
        .bind(key.kind.as_str())
        .bind(&key.entity_id)
        .bind(state.as_str())
        .bind(now)
        .execute(pool)
        .await?;
        Ok(())
    }
}
