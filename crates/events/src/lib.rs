//! Alert fan-out and notification delivery.
//!
//! - [`AlertBus`]: in-process publish/subscribe hub for [`AlertEvent`]s,
//!   backed by `tokio::sync::broadcast`.
//! - [`NotificationDispatcher`]: background task that hands every alert to
//!   the configured delivery channels.
//! - [`delivery`]: Telegram, webhook and log-only channels.
//!
//! [`AlertEvent`]: healthwatch_core::alert::AlertEvent

pub mod bus;
pub mod delivery;
pub mod dispatcher;

pub use bus::AlertBus;
pub use delivery::log::LogNotifier;
pub use delivery::telegram::TelegramNotifier;
pub use delivery::webhook::WebhookNotifier;
pub use delivery::{Notifier, NotifyError};
pub use dispatcher::NotificationDispatcher;
