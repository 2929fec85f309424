//! Background service that delivers alerts from the bus.
//!
//! [`NotificationDispatcher`] subscribes to the [`AlertBus`](crate::bus::AlertBus)
//! and hands every received alert to each configured [`Notifier`]. It runs
//! as a long-lived task and exits when the bus sender is dropped.

use std::sync::Arc;

use futures::future::join_all;
use healthwatch_core::alert::AlertEvent;
use tokio::sync::broadcast;

use crate::delivery::log::LogNotifier;
use crate::delivery::Notifier;

/// Fans each alert out to the configured channels.
pub struct NotificationDispatcher {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl NotificationDispatcher {
    /// Build a dispatcher; with no channels, alerts are only logged.
    pub fn new(notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        let notifiers = if notifiers.is_empty() {
            tracing::warn!("No alert channel configured, alerts will only be logged");
            vec![Arc::new(LogNotifier) as Arc<dyn Notifier>]
        } else {
            notifiers
        };
        Self { notifiers }
    }

    pub fn channel_names(&self) -> Vec<&'static str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }

    /// Run the dispatch loop until the bus is closed.
    pub async fn run(self, mut receiver: broadcast::Receiver<AlertEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.dispatch(&event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Alert dispatcher lagged, some alerts were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Alert bus closed, dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver one alert through every channel concurrently.
    ///
    /// Returns the number of channels that delivered successfully. Failures
    /// are logged; the alert is not retried beyond the channel's own policy.
    pub async fn dispatch(&self, event: &AlertEvent) -> usize {
        let attempts = self
            .notifiers
            .iter()
            .map(|notifier| async move { (notifier.name(), notifier.notify(event).await) });

        let mut delivered = 0;
        for (channel, result) in join_all(attempts).await {
            match result {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::error!(
                        channel,
                        subject = %event.subject,
                        error = %e,
                        "Alert delivery failed"
                    );
                }
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use healthwatch_core::alert::AlertSubject;
    use healthwatch_core::snapshot::{EntityKey, EntityKind};
    use healthwatch_core::state::MonitorState;

    use super::*;
    use crate::bus::AlertBus;
    use crate::delivery::NotifyError;

    #[derive(Default)]
    struct RecordingNotifier {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError> {
            self.seen.lock().unwrap().push(event.message.clone());
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn notify(&self, _event: &AlertEvent) -> Result<(), NotifyError> {
            Err(NotifyError::HttpStatus(500))
        }
    }

    /// Succeeds after a fixed delay.
    struct SlowNotifier(Duration);

    #[async_trait]
    impl Notifier for SlowNotifier {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn notify(&self, _event: &AlertEvent) -> Result<(), NotifyError> {
            tokio::time::sleep(self.0).await;
            Ok(())
        }
    }

    fn event(name: &str) -> AlertEvent {
        AlertEvent::new(
            AlertSubject::Entity(EntityKey {
                kind: EntityKind::Gpu,
                entity_id: name.into(),
            }),
            MonitorState::Healthy,
            MonitorState::Unhealthy,
            Utc::now(),
        )
    }

    #[test]
    fn empty_channel_list_falls_back_to_log() {
        let dispatcher = NotificationDispatcher::new(Vec::new());
        assert_eq!(dispatcher.channel_names(), vec!["log"]);
    }

    #[tokio::test]
    async fn failing_channel_does_not_block_others() {
        let recorder = Arc::new(RecordingNotifier::default());
        let channels: Vec<Arc<dyn Notifier>> = vec![Arc::new(FailingNotifier), recorder.clone()];
        let dispatcher = NotificationDispatcher::new(channels);

        assert_eq!(dispatcher.dispatch(&event("gpu-0")).await, 1);
        assert_eq!(recorder.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_channels_are_delivered_concurrently() {
        let channels: Vec<Arc<dyn Notifier>> = vec![
            Arc::new(SlowNotifier(Duration::from_secs(30))),
            Arc::new(SlowNotifier(Duration::from_secs(30))),
            Arc::new(FailingNotifier),
        ];
        let dispatcher = NotificationDispatcher::new(channels);

        let started = tokio::time::Instant::now();
        assert_eq!(dispatcher.dispatch(&event("gpu-0")).await, 2);
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test]
    async fn run_delivers_every_alert_then_exits_on_close() {
        let bus = AlertBus::default();
        let recorder = Arc::new(RecordingNotifier::default());
        let dispatcher = NotificationDispatcher::new(vec![recorder.clone() as Arc<dyn Notifier>]);
        let handle = tokio::spawn(dispatcher.run(bus.subscribe()));

        bus.publish(event("gpu-0"));
        bus.publish(event("gpu-1"));
        drop(bus);

        handle.await.unwrap();
        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].starts_with("GPU gpu-0"));
        assert!(seen[1].starts_with("GPU gpu-1"));
    }
}
