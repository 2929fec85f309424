//! Log-only fallback channel.

use async_trait::async_trait;
use healthwatch_core::alert::AlertEvent;

use super::{Notifier, NotifyError};

/// Writes each alert to the log. Used when no other channel is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError> {
        tracing::warn!(
            recipient = ?event.recipient,
            from = %event.previous_state,
            to = %event.new_state,
            "ALERT: {}",
            event.message,
        );
        Ok(())
    }
}
