use healthwatch_core::snapshot::{MetricMap, MetricSnapshot};
use healthwatch_core::types::Timestamp;
use sqlx::types::Json;
use sqlx::FromRow;

use super::decode_err;

/// A row from the `metric_snapshots` table.
#[derive(Debug, Clone, FromRow)]
pub struct SnapshotRow {
    pub entity_kind: String,
    pub entity_id: String,
    pub metrics: Json<MetricMap>,
    pub collected_at: Timestamp,
}

impl TryFrom<SnapshotRow> for MetricSnapshot {
    type Error = sqlx::Error;

    fn try_from(row: SnapshotRow) -> Result<Self, Self::Error> {
        Ok(MetricSnapshot::new(
            row.entity_kind.parse().map_err(decode_err)?,
            row.entity_id,
            row.metrics.0,
            row.collected_at,
        ))
    }
}
