//! Background tasks started alongside the HTTP server.
//!
//! Each submodule provides a long-running async function intended to be
//! spawned via `tokio::spawn`. The monitor loop accepts a
//! [`CancellationToken`](tokio_util::sync::CancellationToken) for graceful
//! shutdown; the alert dispatcher stops when the alert bus is dropped.

pub mod alerts;
pub mod monitor;
