//! In-process alert bus backed by a `tokio::sync::broadcast` channel.
//!
//! Shared as `Arc<AlertBus>` between the scheduler (publisher) and the
//! notification dispatcher (subscriber).

use healthwatch_core::alert::AlertEvent;
use tokio::sync::broadcast;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out bus for [`AlertEvent`]s.
pub struct AlertBus {
    sender: broadcast::Sender<AlertEvent>,
}

impl AlertBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unconsumed alerts are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an alert to all current subscribers.
    ///
    /// Returns the number of subscribers that will see it. With no
    /// subscribers the alert is dropped.
    pub fn publish(&self, event: AlertEvent) -> usize {
        match self.sender.send(event) {
            Ok(n) => n,
            Err(broadcast::error::SendError(event)) => {
                tracing::warn!(subject = %event.subject, "Alert published with no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.sender.subscribe()
    }
}

impl Default for AlertBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
