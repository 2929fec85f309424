//! Alert events produced on state transitions.

use std::fmt;

use serde::Serialize;

use crate::snapshot::EntityKey;
use crate::state::MonitorState;
use crate::types::{DbId, Timestamp};

/// Identity of the thing whose state changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AlertSubject {
    Target {
        id: DbId,
        owner_id: DbId,
        address: String,
    },
    Entity(EntityKey),
}

impl AlertSubject {
    /// Store key under which this subject's state is kept.
    pub fn key(&self) -> SubjectKey {
        match self {
            AlertSubject::Target { id, .. } => SubjectKey::Target(*id),
            AlertSubject::Entity(key) => SubjectKey::Entity(key.clone()),
        }
    }

    /// The owner to notify, if the subject has one.
    ///
    /// Entities are not owned; their alerts go to the operator chat.
    pub fn owner(&self) -> Option<DbId> {
        match self {
            AlertSubject::Target { owner_id, .. } => Some(*owner_id),
            AlertSubject::Entity(_) => None,
        }
    }
}

impl fmt::Display for AlertSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSubject::Target { address, .. } => write!(f, "Target {address}"),
            AlertSubject::Entity(key) => fmt::Display::fmt(key, f),
        }
    }
}

/// Key of a stored state row. One reconciliation runs per key at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubjectKey {
    Target(DbId),
    Entity(EntityKey),
}

/// A single state change, ready for delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    pub subject: AlertSubject,
    /// Owner chat to notify; `None` routes to the operator chat.
    pub recipient: Option<DbId>,
    pub previous_state: MonitorState,
    pub new_state: MonitorState,
    pub occurred_at: Timestamp,
    /// Rendered one-line alert text.
    pub message: String,
}

impl AlertEvent {
    pub fn new(
        subject: AlertSubject,
        previous_state: MonitorState,
        new_state: MonitorState,
        occurred_at: Timestamp,
    ) -> Self {
        let message = render_message(&subject, previous_state, new_state, occurred_at);
        Self {
            recipient: subject.owner(),
            subject,
            previous_state,
            new_state,
            occurred_at,
            message,
        }
    }

    /// Append the issues that caused an entity to become unhealthy.
    pub fn with_issues(mut self, issues: &[String]) -> Self {
        if !issues.is_empty() {
            self.message = format!("{} ({})", self.message, issues.join(", "));
        }
        self
    }
}

/// Render the plain alert line, e.g.
/// `"Target 10.0.0.5:22 changed UP -> DOWN at 2026-01-01 12:00:00 UTC"`.
pub fn render_message(
    subject: &AlertSubject,
    previous_state: MonitorState,
    new_state: MonitorState,
    occurred_at: Timestamp,
) -> String {
    format!(
        "{subject} changed {} -> {} at {}",
        previous_state.label(),
        new_state.label(),
        occurred_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}
