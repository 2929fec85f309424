//! Health evaluation of metric snapshots.
//!
//! All logic in this module is pure (no store access): the caller fetches
//! snapshots and passes them in along with the evaluation time.

pub mod rules;
pub mod size;
pub mod summary;

pub use rules::{evaluate, HealthRule, RuleContext, RuleSet};
pub use summary::{summarize, EntityAssessment, HealthSummary, OverallStatus};
