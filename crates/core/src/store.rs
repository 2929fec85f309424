//! Persistence seams used by the monitor and the API.
//!
//! Implemented by the SQLite store in `healthwatch-db` and by
//! [`MemoryStore`](crate::memory_store::MemoryStore) for tests.

use async_trait::async_trait;

use crate::alert::SubjectKey;
use crate::error::StoreError;
use crate::snapshot::{EntityKind, MetricSnapshot};
use crate::state::MonitorState;
use crate::target::MonitorTarget;
use crate::types::{DbId, Timestamp};

/// Durable table of monitored targets.
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Every target across all owners, ordered by id.
    async fn list_targets(&self) -> Result<Vec<MonitorTarget>, StoreError>;

    async fn list_targets_for_owner(&self, owner_id: DbId)
        -> Result<Vec<MonitorTarget>, StoreError>;

    /// Insert a target in the `Unknown` state.
    ///
    /// Returns [`StoreError::Duplicate`] when `(owner_id, address)` exists.
    async fn insert_target(
        &self,
        owner_id: DbId,
        address: &str,
    ) -> Result<MonitorTarget, StoreError>;

    /// Returns `false` when no row matched.
    async fn delete_target(&self, owner_id: DbId, address: &str) -> Result<bool, StoreError>;
}

/// Latest snapshot per entity, last write wins.
#[async_trait]
pub trait MetricStore: Send + Sync {
    async fn upsert_snapshots(&self, snapshots: &[MetricSnapshot]) -> Result<(), StoreError>;

    /// Snapshots ordered by kind then entity id, optionally filtered by kind.
    async fn list_snapshots(
        &self,
        kind: Option<EntityKind>,
    ) -> Result<Vec<MetricSnapshot>, StoreError>;
}

/// Last reconciled state per subject.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// `None` when the subject has never been reconciled.
    async fn load_state(&self, key: &SubjectKey) -> Result<Option<MonitorState>, StoreError>;

    async fn store_state(
        &self,
        key: &SubjectKey,
        state: MonitorState,
        at: Timestamp,
    ) -> Result<(), StoreError>;
}
