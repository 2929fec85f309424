//! [`SqliteStore`]: the store traits backed by the repositories.

use async_trait::async_trait;
use chrono::Utc;
use healthwatch_core::alert::SubjectKey;
use healthwatch_core::error::StoreError;
use healthwatch_core::snapshot::{EntityKind, MetricSnapshot};
use healthwatch_core::state::MonitorState;
use healthwatch_core::store::{MetricStore, StateStore, TargetStore};
use healthwatch_core::target::MonitorTarget;
use healthwatch_core::types::{DbId, Timestamp};

use crate::repositories::{EntityHealthRepo, MetricSnapshotRepo, TargetRepo};
use crate::DbPool;

/// Store handle shared by the scheduler and the API.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Map a driver error onto the store error surface.
fn store_err(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(db.message().to_string())
        }
        _ => StoreError::Unavailable(err.to_string()),
    }
}

#[async_trait]
impl TargetStore for SqliteStore {
    async fn list_targets(&self) -> Result<Vec<MonitorTarget>, StoreError> {
        TargetRepo::list(&self.pool).await.map_err(store_err)
    }

    async fn list_targets_for_owner(
        &self,
        owner_id: DbId,
    ) -> Result<Vec<MonitorTarget>, StoreError> {
        TargetRepo::list_by_owner(&self.pool, owner_id)
            .await
            .map_err(store_err)
    }

    async fn insert_target(
        &self,
        owner_id: DbId,
        address: &str,
    ) -> Result<MonitorTarget, StoreError> {
        TargetRepo::create(&self.pool, owner_id, address, Utc::now())
            .await
            .map_err(store_err)
    }

    async fn delete_target(&self, owner_id: DbId, address: &str) -> Result<bool, StoreError> {
        TargetRepo::delete(&self.pool, owner_id, address)
            .await
            .map_err(store_err)
    }
}

#[async_trait]
impl MetricStore for SqliteStore {
    async fn upsert_snapshots(&self, snapshots: &[MetricSnapshot]) -> Result<(), StoreError> {
        MetricSnapshotRepo::upsert_batch(&self.pool, snapshots)
            .await
            .map_err(store_err)
    }

    async fn list_snapshots(
        &self,
        kind: Option<EntityKind>,
    ) -> Result<Vec<MetricSnapshot>, StoreError> {
        MetricSnapshotRepo::list(&self.pool, kind)
            .await
            .map_err(store_err)
    }
}

#[async_trait]
impl StateStore for SqliteStore {
    async fn load_state(&self, key: &SubjectKey) -> Result<Option<MonitorState>, StoreError> {
        match key {
            SubjectKey::Target(id) => Ok(TargetRepo::find_by_id(&self.pool, *id)
                .await
                .map_err(store_err)?
                .map(|t| t.last_state)),
            SubjectKey::Entity(entity) => EntityHealthRepo::find(&self.pool, entity)
                .await
                .map_err(store_err)?
                .map(|row| row.monitor_state().map_err(store_err))
                .transpose(),
        }
    }

    async fn store_state(
        &self,
        key: &SubjectKey,
        state: MonitorState,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        let result = match key {
            SubjectKey::Target(id) => TargetRepo::update_state(&self.pool, *id, state, at).await,
            SubjectKey::Entity(entity) => {
                EntityHealthRepo::upsert(&self.pool, entity, state, at).await
            }
        };
        result.map_err(store_err)
    }
}
