//! Alert delivery wiring.

use std::sync::Arc;

use healthwatch_events::{
    AlertBus, NotificationDispatcher, Notifier, NotifyError, TelegramNotifier, WebhookNotifier,
};
use tokio::task::JoinHandle;

use crate::config::MonitorConfig;

/// Build the delivery channels enabled by `config`.
///
/// Telegram needs a bot token; the webhook needs a URL. An empty result
/// makes the dispatcher fall back to log-only delivery.
pub fn build_notifiers(config: &MonitorConfig) -> Result<Vec<Arc<dyn Notifier>>, NotifyError> {
    let mut notifiers: Vec<Arc<dyn Notifier>> = Vec::new();

    if let Some(token) = &config.telegram_bot_token {
        if config.alert_chat_id.is_none() {
            tracing::warn!("ALERT_CHAT_ID is not set, GPU and host alerts will not reach Telegram");
        }
        notifiers.push(Arc::new(TelegramNotifier::new(
            token.clone(),
            config.alert_chat_id,
        )?));
    }

    if let Some(url) = &config.alert_webhook_url {
        notifiers.push(Arc::new(WebhookNotifier::new(url.clone())?));
    }

    Ok(notifiers)
}

/// Spawn the dispatcher. It exits once every [`AlertBus`] handle is dropped.
pub fn spawn(bus: &AlertBus, notifiers: Vec<Arc<dyn Notifier>>) -> JoinHandle<()> {
    let dispatcher = NotificationDispatcher::new(notifiers);
    tracing::info!(channels = ?dispatcher.channel_names(), "Alert dispatcher started");
    tokio::spawn(dispatcher.run(bus.subscribe()))
}
