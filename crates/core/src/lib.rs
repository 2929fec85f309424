//! Domain logic for the healthwatch monitor.
//!
//! Everything here is independent of the database and the HTTP layer:
//! health rules, transition detection, target validation, and the store
//! traits the other crates implement or consume.

pub mod access;
pub mod alert;
pub mod error;
pub mod health;
pub mod memory_store;
pub mod metric_names;
pub mod rate_limit;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod target;
pub mod transition;
pub mod types;
