//! Periodic probing and health evaluation.
//!
//! [`Scheduler`] drives the monitoring loop: every tick it probes all
//! targets through a [`Prober`], evaluates all metric snapshots, reconciles
//! the resulting states and publishes any transitions on the alert bus.

pub mod probe;
pub mod scheduler;

pub use probe::{Prober, TcpProber};
pub use scheduler::{ScheduleError, Scheduler, SchedulerConfig, TickReport};
