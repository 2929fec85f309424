//! TCP reachability probes.

use std::time::Duration;

use async_trait::async_trait;
use healthwatch_core::state::MonitorState;
use tokio::net::TcpStream;

/// Default connect timeout for a single probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness check for a single target address.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Returns `Up` or `Down`; never fails.
    async fn probe(&self, address: &str) -> MonitorState;
}

/// Probes by opening (and immediately closing) a TCP connection.
#[derive(Debug, Clone)]
pub struct TcpProber {
    timeout: Duration,
}

impl TcpProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, address: &str) -> MonitorState {
        match tokio::time::timeout(self.timeout, TcpStream::connect(address)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                MonitorState::Up
            }
            Ok(Err(e)) => {
                tracing::debug!(address, error = %e, "Probe connect failed");
                MonitorState::Down
            }
            Err(_) => {
                tracing::debug!(
                    address,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Probe timed out"
                );
                MonitorState::Down
            }
        }
    }
}
