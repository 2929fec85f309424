//! Observed states tracked by the transition detector.
//!
//! Targets move between `Up` and `Down` (starting from `Unknown` when first
//! added); metric-backed entities move between `Healthy` and `Unhealthy`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The last computed state of a target or entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorState {
    /// Not yet observed. Only ever stored for freshly added targets.
    Unknown,
    /// The target accepted a TCP connection.
    Up,
    /// The target could not be reached.
    Down,
    /// The entity's latest snapshot raised no issues.
    Healthy,
    /// The entity's latest snapshot raised at least one issue.
    Unhealthy,
}

impl MonitorState {
    /// Canonical lowercase name, as persisted in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            MonitorState::Unknown => "unknown",
            MonitorState::Up => "up",
            MonitorState::Down => "down",
            MonitorState::Healthy => "healthy",
            MonitorState::Unhealthy => "unhealthy",
        }
    }

    /// Display label used in rendered alert messages.
    pub fn label(self) -> &'static str {
        match self {
            MonitorState::Unknown => "UNKNOWN",
            MonitorState::Up => "UP",
            MonitorState::Down => "DOWN",
            MonitorState::Healthy => "HEALTHY",
            MonitorState::Unhealthy => "UNHEALTHY",
        }
    }

    /// Map a probe result to a target state.
    pub fn from_reachable(reachable: bool) -> Self {
        if reachable {
            MonitorState::Up
        } else {
            MonitorState::Down
        }
    }

    /// Map an issue count to an entity health state.
    pub fn from_issue_count(count: usize) -> Self {
        if count == 0 {
            MonitorState::Healthy
        } else {
            MonitorState::Unhealthy
        }
    }
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a persisted state name is not recognised.
#[derive(Debug, thiserror::Error)]
#[error("unknown monitor state: {0}")]
pub struct ParseStateError(pub String);

impl FromStr for MonitorState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(MonitorState::Unknown),
            "up" => Ok(MonitorState::Up),
            "down" => Ok(MonitorState::Down),
            "healthy" => Ok(MonitorState::Healthy),
            "unhealthy" => Ok(MonitorState::Unhealthy),
            other => Err(ParseStateError(other.to_string())),
        }
    }
}
