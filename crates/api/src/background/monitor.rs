//! The periodic probe and evaluation loop.

use std::sync::Arc;

use healthwatch_db::SqliteStore;
use healthwatch_events::AlertBus;
use healthwatch_monitor::{Scheduler, TcpProber};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::MonitorConfig;

/// Spawn the monitor scheduler over the SQLite store with a TCP prober.
pub fn spawn(
    store: Arc<SqliteStore>,
    bus: Arc<AlertBus>,
    config: &MonitorConfig,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let prober = Arc::new(TcpProber::new(config.probe_timeout));
    let scheduler = Arc::new(Scheduler::new(
        store,
        prober,
        bus,
        config.scheduler_config(),
    ));
    tokio::spawn(scheduler.run(cancel))
}
