pub mod hardware;
pub mod health;
pub mod ingest;
pub mod snapshots;
pub mod targets;
