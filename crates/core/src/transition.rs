//! Edge-triggered transition detection.
//!
//! [`TransitionDetector::reconcile`] compares a freshly computed state with
//! the stored one and yields an [`AlertEvent`] only when it changed. The
//! first observation of a subject is recorded silently.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};

use tokio::sync::Mutex as AsyncMutex;

use crate::alert::{AlertEvent, AlertSubject, SubjectKey};
use crate::error::StoreError;
use crate::state::MonitorState;
use crate::store::StateStore;
use crate::types::Timestamp;

type KeyLock = Arc<AsyncMutex<()>>;

/// Serialises reconciliations per subject and persists state changes.
pub struct TransitionDetector {
    store: Arc<dyn StateStore>,
    locks: std::sync::Mutex<HashMap<SubjectKey, KeyLock>>,
}

impl TransitionDetector {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            store,
            locks: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Reconcile `new_state` for `subject` against the stored state.
    ///
    /// - no stored state (or `Unknown`): store it, no event
    /// - same state: no write, no event
    /// - different state: store it and return exactly one event
    ///
    /// On a store error nothing is emitted; the caller retries next tick.
    pub async fn reconcile(
        &self,
        subject: &AlertSubject,
        new_state: MonitorState,
        now: Timestamp,
    ) -> Result<Option<AlertEvent>, StoreError> {
        let key = subject.key();
        let lock = self.lock_for(&key);

        let result = {
            let _guard = lock.lock().await;
            self.reconcile_locked(subject, &key, new_state, now).await
        };

        self.release(&key, lock);
        result
    }

    async fn reconcile_locked(
        &self,
        subject: &AlertSubject,
        key: &SubjectKey,
        new_state: MonitorState,
        now: Timestamp,
    ) -> Result<Option<AlertEvent>, StoreError> {
        let previous = self.store.load_state(key).await?;

        match previous {
            Some(prev) if prev == new_state => Ok(None),
            None | Some(MonitorState::Unknown) => {
                self.store.store_state(key, new_state, now).await?;
                tracing::debug!(subject = %subject, state = %new_state, "First observation recorded");
                Ok(None)
            }
            Some(prev) => {
                self.store.store_state(key, new_state, now).await?;
                tracing::info!(
                    subject = %subject,
                    from = %prev,
                    to = %new_state,
                    "State transition",
                );
                Ok(Some(AlertEvent::new(subject.clone(), prev, new_state, now)))
            }
        }
    }

    fn lock_for(&self, key: &SubjectKey) -> KeyLock {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(key.clone()).or_default())
    }

    /// Drop the per-key lock once no other reconciliation holds a handle.
    fn release(&self, key: &SubjectKey, lock: KeyLock) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Handles are only cloned and dropped under the map lock.
        drop(lock);
        if locks.get(key).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(key);
        }
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
