//! In-memory implementation of every store trait.
//!
//! Backs unit tests of the detector and scheduler. Failure injection
//! helpers let tests exercise the skip-on-error paths.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::alert::SubjectKey;
use crate::error::StoreError;
use crate::snapshot::{EntityKey, EntityKind, MetricSnapshot};
use crate::state::MonitorState;
use crate::store::{MetricStore, StateStore, TargetStore};
use crate::target::MonitorTarget;
use crate::types::{DbId, Timestamp};

#[derive(Default)]
struct Inner {
    next_id: DbId,
    targets: BTreeMap<DbId, MonitorTarget>,
    snapshots: BTreeMap<EntityKey, MetricSnapshot>,
    entity_states: HashMap<EntityKey, MonitorState>,
    failing_writes: HashSet<SubjectKey>,
    fail_reads: bool,
    state_writes: usize,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `store_state` for `key` fail.
    pub async fn fail_writes_for(&self, key: SubjectKey) {
        self.inner.lock().await.failing_writes.insert(key);
    }

    /// Make every list operation fail until reset.
    pub async fn set_fail_reads(&self, fail: bool) {
        self.inner.lock().await.fail_reads = fail;
    }

    /// Number of successful `store_state` calls so far.
    pub async fn state_writes(&self) -> usize {
        self.inner.lock().await.state_writes
    }
}

fn unavailable() -> StoreError {
    StoreError::Unavailable("memory store read failure injected".to_string())
}

#[async_trait]
impl TargetStore for MemoryStore {
    async fn list_targets(&self) -> Result<Vec<MonitorTarget>, StoreError> {
        let inner = self.inner.lock().await;
        if inner.fail_reads {
            return Err(unavailable());
        }
        Ok(inner.targets.values().cloned().collect())
    }

    async fn list_targets_for_owner(
        &self,
        owner_id: DbId,
    ) -> Result<Vec<MonitorTarget>, StoreError> {
        let inner = self.inner.lock().await;
        if inner.fail_reads {
            return Err(unavailable());
        }
        Ok(inner
            .targets
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn insert_target(
        &self,
        owner_id: DbId,
        address: &str,
    ) -> Result<MonitorTarget, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner
            .targets
            .values()
            .any(|t| t.owner_id == owner_id && t.address == address)
        {
            return Err(StoreError::Duplicate(format!("{owner_id}/{address}")));
        }
        inner.next_id += 1;
        let now = Utc::now();
        let target = MonitorTarget {
            id: inner.next_id,
            owner_id,
            address: address.to_string(),
            last_state: MonitorState::Unknown,
            created_at: now,
            updated_at: now,
        };
        inner.targets.insert(target.id, target.clone());
        Ok(target)
    }

    async fn delete_target(&self, owner_id: DbId, address: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let id = inner
            .targets
            .values()
            .find(|t| t.owner_id == owner_id && t.address == address)
            .map(|t| t.id);
        Ok(id.and_then(|id| inner.targets.remove(&id)).is_some())
    }
}

#[async_trait]
impl MetricStore for MemoryStore {
    async fn upsert_snapshots(&self, snapshots: &[MetricSnapshot]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        for snap in snapshots {
            inner.snapshots.insert(snap.key(), snap.clone());
        }
        Ok(())
    }

    async fn list_snapshots(
        &self,
        kind: Option<EntityKind>,
    ) -> Result<Vec<MetricSnapshot>, StoreError> {
        let inner = self.inner.lock().await;
        if inner.fail_reads {
            return Err(unavailable());
        }
        Ok(inner
            .snapshots
            .values()
            .filter(|s| kind.is_none_or(|k| s.entity_kind == k))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load_state(&self, key: &SubjectKey) -> Result<Option<MonitorState>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(match key {
            SubjectKey::Target(id) => inner.targets.get(id).map(|t| t.last_state),
            SubjectKey::Entity(entity) => inner.entity_states.get(entity).copied(),
        })
    }

    async fn store_state(
        &self,
        key: &SubjectKey,
        state: MonitorState,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.failing_writes.contains(key) {
            return Err(StoreError::Unavailable(format!(
                "write failure injected for {key:?}"
            )));
        }
        match key {
            SubjectKey::Target(id) => {
                if let Some(target) = inner.targets.get_mut(id) {
                    target.last_state = state;
                    target.updated_at = at;
                }
            }
            SubjectKey::Entity(entity) => {
                inner.entity_states.insert(entity.clone(), state);
            }
        }
        inner.state_writes += 1;
        Ok(())
    }
}
