//! Telegram Bot API delivery.
//!
//! Alerts are sent with `sendMessage`. Target alerts go to the owner's chat
//! (owner ids are Telegram chat ids); entity alerts go to the operator chat.

use std::time::Duration;

use async_trait::async_trait;
use healthwatch_core::alert::AlertEvent;
use healthwatch_core::types::DbId;
use serde::Serialize;

use super::{Notifier, NotifyError};

/// Public Bot API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// HTTP request timeout for a single send.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: DbId,
    text: &'a str,
}

/// Sends alerts through a Telegram bot.
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
    operator_chat: Option<DbId>,
}

impl TelegramNotifier {
    pub fn new(bot_token: impl Into<String>, operator_chat: Option<DbId>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            bot_token: bot_token.into(),
            operator_chat,
        })
    }

    /// Point the notifier at a different Bot API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Chat to deliver `event` to: the owner, else the operator chat.
    pub fn chat_for(&self, event: &AlertEvent) -> Option<DbId> {
        event.recipient.or(self.operator_chat)
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError> {
        let chat_id = self.chat_for(event).ok_or(NotifyError::NoRecipient)?;
        let body = SendMessage {
            chat_id,
            text: &event.message,
        };

        let response = self
            .client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.without_url()))?;
        if !response.status().is_success() {
            return Err(NotifyError::HttpStatus(response.status().as_u16()));
        }
        tracing::debug!(chat_id, "Telegram alert sent");
        Ok(())
    }
}
