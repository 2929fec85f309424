//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&SqlitePool` as the first argument.

pub mod entity_health_repo;
pub mod hardware_report_repo;
pub mod metric_snapshot_repo;
pub mod target_repo;

pub use entity_health_repo::EntityHealthRepo;
pub use hardware_report_repo::HardwareReportRepo;
pub use metric_snapshot_repo::MetricSnapshotRepo;
pub use target_repo::TargetRepo;
