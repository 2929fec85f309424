//! Per-owner cool-down on target management commands.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::error::CoreError;
use crate::types::DbId;

/// Default cool-down between two accepted commands from the same owner.
pub const DEFAULT_COMMAND_COOLDOWN_SECS: u64 = 60;

/// Map size at which expired windows are swept before inserting.
const PRUNE_THRESHOLD: usize = 1024;

/// Remembers the last accepted command instant per owner.
///
/// A command submitted inside the cool-down window is rejected with
/// [`CoreError::RateLimited`] and does not reset the window.
#[derive(Debug)]
pub struct CommandRateLimiter {
    cooldown: Duration,
    last_accepted: Mutex<HashMap<DbId, Instant>>,
}

impl CommandRateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: Mutex::new(HashMap::new()),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Admit or reject a command from `owner_id` submitted now.
    pub fn check(&self, owner_id: DbId) -> Result<(), CoreError> {
        self.check_at(owner_id, Instant::now())
    }

    pub fn check_at(&self, owner_id: DbId, now: Instant) -> Result<(), CoreError> {
        let mut last = self
            .last_accepted
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(prev) = last.get(&owner_id) {
            let elapsed = now.saturating_duration_since(*prev);
            if elapsed < self.cooldown {
                return Err(CoreError::RateLimited {
                    retry_after: self.cooldown - elapsed,
                });
            }
        }

        if last.len() >= PRUNE_THRESHOLD {
            let cooldown = self.cooldown;
            last.retain(|_, prev| now.saturating_duration_since(*prev) < cooldown);
        }
        last.insert(owner_id, now);
        Ok(())
    }
}

impl Default for CommandRateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_COMMAND_COOLDOWN_SECS))
    }
}
