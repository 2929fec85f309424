//! Repository for the `metric_snapshots` table (latest value per entity).

use healthwatch_core::snapshot::{EntityKind, MetricSnapshot};
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::snapshot::SnapshotRow;

/// Column list for `metric_snapshots` SELECT queries.
const COLUMNS: &str = "entity_kind, entity_id, metrics, collected_at";

/// Provides query operations for metric snapshots.
pub struct MetricSnapshotRepo;

impl MetricSnapshotRepo {
    /// Upsert a batch of snapshots in one transaction.
    ///
    /// Each row replaces any previous snapshot for the same
    /// `(entity_kind, entity_id)`.
    pub async fn upsert_batch(
        pool: &SqlitePool,
        snapshots: &[MetricSnapshot],
    ) -> Result<(), sqlx::Error> {
        if snapshots.is_empty() {
            return Ok(());
        }

        let mut tx = pool.begin().await?;
        for snap in snapshots {
            sqlx::query(
                "INSERT INTO metric_snapshots (entity_kind, entity_id, metrics, collected_at) \
                 VALUES (?, ?, ?, ?) \
                 ON CONFLICT (entity_kind, entity_id) DO UPDATE SET \
                     metrics = excluded.metrics, \
                     collected_at = excluded.collected_at",
            )
            .bind(snap.entity_kind.as_str())
            .bind(&snap.entity_id)
            .bind(Json(&snap.metrics))
            .bind(snap.collected_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }

    /// List snapshots ordered by kind then entity id.
    pub async fn list(
        pool: &SqlitePool,
        kind: Option<EntityKind>,
    ) -> Result<Vec<MetricSnapshot>, sqlx::Error> {
        let rows = match kind {
            Some(kind) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM metric_snapshots \
                     WHERE entity_kind = ? ORDER BY entity_id"
                );
                sqlx::query_as::<_, SnapshotRow>(&query)
                    .bind(kind.as_str())
                    .fetch_all(pool)
                    .await?
            }
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM metric_snapshots ORDER BY entity_kind, entity_id"
                );
                sqlx::query_as::<_, SnapshotRow>(&query)
                    .fetch_all(pool)
                    .await?
            }
        };
        rows.into_iter().map(MetricSnapshot::try_from).collect()
    }
}
