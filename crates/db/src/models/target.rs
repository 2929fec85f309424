use healthwatch_core::target::MonitorTarget;
use healthwatch_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::decode_err;

/// A row from the `monitor_targets` table.
#[derive(Debug, Clone, FromRow)]
pub struct TargetRow {
    pub id: DbId,
    pub owner_id: DbId,
    pub address: String,
    pub last_state: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<TargetRow> for MonitorTarget {
    type Error = sqlx::Error;

    fn try_from(row: TargetRow) -> Result<Self, Self::Error> {
        Ok(MonitorTarget {
            id: row.id,
            owner_id: row.owner_id,
            address: row.address,
            last_state: row.last_state.parse().map_err(decode_err)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
