//! External delivery channels for alerts.
//!
//! Each channel implements [`Notifier`]. The dispatcher calls every
//! configured notifier for every alert; failures are reported back and
//! logged but never affect the stored monitor state.

use async_trait::async_trait;
use healthwatch_core::alert::AlertEvent;

pub mod log;
pub mod telegram;
pub mod webhook;

/// Error type for alert delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Remote returned HTTP {0}")]
    HttpStatus(u16),

    /// The alert has no owner and no operator chat is configured.
    #[error("No recipient for alert")]
    NoRecipient,
}

/// A channel that can deliver a rendered alert to its recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short channel name used in logs.
    fn name(&self) -> &'static str;

    /// Deliver `event.message` to `event.recipient` (or the channel default).
    async fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError>;
}
