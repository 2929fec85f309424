//! Webhook delivery with exponential-backoff retry.
//!
//! [`WebhookNotifier`] POSTs the JSON-encoded [`AlertEvent`] to a fixed URL.
//! Failed attempts are retried three times with exponential backoff
//! (1 s, 2 s, 4 s).

use std::time::Duration;

use async_trait::async_trait;
use healthwatch_core::alert::AlertEvent;

use super::{Notifier, NotifyError};

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers alerts to an external webhook endpoint.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    /// Host part of `url`, the only piece of it that is logged.
    host: String,
    retry_delays: Vec<Duration>,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let url = url.into();
        let host = reqwest::Url::parse(&url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "<invalid>".to_string());
        Ok(Self {
            client,
            url,
            host,
            retry_delays: RETRY_DELAYS_SECS
                .iter()
                .map(|s| Duration::from_secs(*s))
                .collect(),
        })
    }

    /// Override the backoff schedule (one retry per entry).
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, event: &AlertEvent) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(event)
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.without_url()))?;
        if !response.status().is_success() {
            return Err(NotifyError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    /// Deliver with retry; returns `Ok(())` on the first successful attempt.
    async fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError> {
        for (attempt, delay) in self.retry_delays.iter().enumerate() {
            match self.try_send(event).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        host = %self.host,
                        error = %e,
                        "Webhook delivery attempt failed, retrying"
                    );
                    tokio::time::sleep(*delay).await;
                }
            }
        }

        // Final attempt after the last backoff.
        self.try_send(event).await.inspect_err(|e| {
            tracing::error!(host = %self.host, error = %e, "Webhook delivery failed after all retries");
        })
    }
}
