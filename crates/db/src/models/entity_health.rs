use healthwatch_core::state::MonitorState;
use healthwatch_core::types::Timestamp;
use sqlx::FromRow;

use super::decode_err;

/// A row from the `entity_health` table.
#[derive(Debug, Clone, FromRow)]
pub struct EntityHealthRow {
    pub entity_kind: String,
    pub entity_id: String,
    pub state: String,
    pub updated_at: Timestamp,
}

impl EntityHealthRow {
    pub fn monitor_state(&self) -> Result<MonitorState, sqlx::Error> {
        self.state.parse().map_err(decode_err)
    }
}
