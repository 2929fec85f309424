//! The periodic monitoring loop.
//!
//! Each tick has two phases:
//!
//! 1. list every target, probe them with bounded concurrency and reconcile
//!    `Up`/`Down`;
//! 2. list every metric snapshot, evaluate the health rules and reconcile
//!    `Healthy`/`Unhealthy` per entity.
//!
//! A failed store read skips the rest of the tick. A failed write skips only
//! that unit, which is retried on the next tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use healthwatch_core::alert::{AlertEvent, AlertSubject};
use healthwatch_core::error::StoreError;
use healthwatch_core::health::rules::DEFAULT_STALE_AFTER_SECS;
use healthwatch_core::health::{EntityAssessment, RuleSet};
use healthwatch_core::snapshot::MetricSnapshot;
use healthwatch_core::state::MonitorState;
use healthwatch_core::store::{MetricStore, StateStore, TargetStore};
use healthwatch_core::target::MonitorTarget;
use healthwatch_core::transition::TransitionDetector;
use healthwatch_core::types::Timestamp;
use healthwatch_events::AlertBus;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::probe::{Prober, DEFAULT_PROBE_TIMEOUT};

/// Default time between ticks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Default number of probes/evaluations in flight per tick.
pub const DEFAULT_CONCURRENCY: usize = 32;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Invalid scheduler settings, rejected before the loop starts.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("probe interval must be greater than zero")]
    ZeroInterval,

    #[error("probe timeout ({timeout:?}) must be shorter than the interval ({interval:?})")]
    TimeoutNotBelowInterval {
        timeout: Duration,
        interval: Duration,
    },

    #[error("probe concurrency must be at least 1")]
    ZeroConcurrency,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub interval: Duration,
    pub probe_timeout: Duration,
    pub concurrency: usize,
    pub stale_after: chrono::Duration,
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.interval.is_zero() {
            return Err(ScheduleError::ZeroInterval);
        }
        if self.probe_timeout >= self.interval {
            return Err(ScheduleError::TimeoutNotBelowInterval {
                timeout: self.probe_timeout,
                interval: self.interval,
            });
        }
        if self.concurrency == 0 {
            return Err(ScheduleError::ZeroConcurrency);
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            stale_after: chrono::Duration::seconds(DEFAULT_STALE_AFTER_SECS),
        }
    }
}

// ---------------------------------------------------------------------------
// Tick report
// ---------------------------------------------------------------------------

/// Counters for one tick, logged at the end of it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Targets probed.
    pub probed: usize,
    /// Snapshots evaluated.
    pub evaluated: usize,
    /// Alerts published.
    pub alerts: usize,
    /// Store reads or writes that failed.
    pub failures: usize,
    /// A store read failed and the tick stopped early.
    pub aborted: bool,
}

impl TickReport {
    fn record(&mut self, outcome: Result<Option<AlertEvent>, StoreError>, bus: &AlertBus) {
        match outcome {
            Ok(Some(event)) => {
                self.alerts += 1;
                bus.publish(event);
            }
            Ok(None) => {}
            Err(e) => {
                self.failures += 1;
                tracing::warn!(error = %e, "Reconcile failed, will retry next tick");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Drives periodic evaluation of every target and entity.
pub struct Scheduler {
    targets: Arc<dyn TargetStore>,
    metrics: Arc<dyn MetricStore>,
    detector: TransitionDetector,
    prober: Arc<dyn Prober>,
    bus: Arc<AlertBus>,
    rules: RuleSet,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new<S>(
        store: Arc<S>,
        prober: Arc<dyn Prober>,
        bus: Arc<AlertBus>,
        config: SchedulerConfig,
    ) -> Self
    where
        S: TargetStore + MetricStore + StateStore + 'static,
    {
        Self {
            targets: store.clone(),
            metrics: store.clone(),
            detector: TransitionDetector::new(store),
            prober,
            rules: RuleSet::new(config.stale_after),
            bus,
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run ticks until `cancel` fires. The first tick runs immediately.
    ///
    /// A tick still in progress at cancellation is abandoned; every write
    /// it makes is a single statement so nothing is left half-applied.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            probe_timeout_ms = self.config.probe_timeout.as_millis() as u64,
            concurrency = self.config.concurrency,
            "Monitor scheduler started"
        );

        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Monitor scheduler stopping");
                    break;
                }
                _ = interval.tick() => {
                    tokio::select! {
                        report = self.tick() => log_report(&report),
                        _ = cancel.cancelled() => {
                            tracing::info!("Monitor scheduler stopping, abandoning tick in progress");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Run one full evaluation pass.
    pub async fn tick(&self) -> TickReport {
        let mut report = TickReport::default();
        let now = Utc::now();

        // --- Targets ---
        let targets = match self.targets.list_targets().await {
            Ok(targets) => targets,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list targets, skipping tick");
                report.failures += 1;
                report.aborted = true;
                return report;
            }
        };
        report.probed = targets.len();

        let outcomes: Vec<_> = stream::iter(targets)
            .map(|target| self.probe_target(target))
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;
        for outcome in outcomes {
            report.record(outcome, &self.bus);
        }

        // --- Entities ---
        let snapshots = match self.metrics.list_snapshots(None).await {
            Ok(snapshots) => snapshots,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list snapshots, skipping tick");
                report.failures += 1;
                report.aborted = true;
                return report;
            }
        };
        report.evaluated = snapshots.len();

        let outcomes: Vec<_> = stream::iter(snapshots)
            .map(|snap| self.evaluate_entity(snap, now))
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;
        for outcome in outcomes {
            report.record(outcome, &self.bus);
        }

        report
    }

    async fn probe_target(
        &self,
        target: MonitorTarget,
    ) -> Result<Option<AlertEvent>, StoreError> {
        let state = self.prober.probe(&target.address).await;
        let subject = AlertSubject::Target {
            id: target.id,
            owner_id: target.owner_id,
            address: target.address,
        };
        self.detector.reconcile(&subject, state, Utc::now()).await
    }

    async fn evaluate_entity(
        &self,
        snapshot: MetricSnapshot,
        now: Timestamp,
    ) -> Result<Option<AlertEvent>, StoreError> {
        let assessment = EntityAssessment::assess(&snapshot, &self.rules, now);
        if assessment.state == MonitorState::Unhealthy {
            tracing::debug!(
                entity = %assessment.key,
                issues = ?assessment.issues,
                "Entity unhealthy"
            );
        }

        let subject = AlertSubject::Entity(assessment.key.clone());
        let event = self
            .detector
            .reconcile(&subject, assessment.state, now)
            .await?;
        Ok(event.map(|e| e.with_issues(&assessment.issues)))
    }
}

fn log_report(report: &TickReport) {
    if report.aborted || report.failures > 0 {
        tracing::warn!(
            probed = report.probed,
            evaluated = report.evaluated,
            alerts = report.alerts,
            failures = report.failures,
            aborted = report.aborted,
            "Monitor tick finished with failures"
        );
    } else {
        tracing::info!(
            probed = report.probed,
            evaluated = report.evaluated,
            alerts = report.alerts,
            "Monitor tick finished"
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use healthwatch_core::alert::SubjectKey;
    use healthwatch_core::memory_store::MemoryStore;
    use healthwatch_core::metric_names::*;
    use healthwatch_core::snapshot::{EntityKind, MetricMap, MetricValue};
    use tokio::sync::broadcast::error::TryRecvError;

    use super::*;

    /// Returns a scripted state per address; unknown addresses are down.
    #[derive(Default)]
    struct FakeProber {
        states: Mutex<HashMap<String, MonitorState>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        delay: Duration,
    }

    impl FakeProber {
        fn set(&self, address: &str, state: MonitorState) {
            self.states
                .lock()
                .unwrap()
                .insert(address.to_string(), state);
        }
    }

    #[async_trait]
    impl Prober for FakeProber {
        async fn probe(&self, address: &str) -> MonitorState {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.states
                .lock()
                .unwrap()
                .get(address)
                .copied()
                .unwrap_or(MonitorState::Down)
        }
    }

    struct Harness {
        store: Arc<MemoryStore>,
        prober: Arc<FakeProber>,
        bus: Arc<AlertBus>,
        scheduler: Arc<Scheduler>,
    }

    fn harness_with(prober: FakeProber, config: SchedulerConfig) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let prober = Arc::new(prober);
        let bus = Arc::new(AlertBus::default());
        let scheduler = Arc::new(Scheduler::new(
            store.clone(),
            prober.clone(),
            bus.clone(),
            config,
        ));
        Harness {
            store,
            prober,
            bus,
            scheduler,
        }
    }

    fn harness() -> Harness {
        harness_with(FakeProber::default(), SchedulerConfig::default())
    }

    fn gpu(name: &str, temp: i64) -> MetricSnapshot {
        let metrics = MetricMap::from([
            (METRIC_TEMPERATURE.to_string(), MetricValue::Integer(temp)),
            (METRIC_PROCESS_COUNT.to_string(), MetricValue::Integer(1)),
        ]);
        MetricSnapshot::new(EntityKind::Gpu, name, metrics, Utc::now())
    }

    // -- config --------------------------------------------------------------

    #[test]
    fn default_config_is_valid() {
        assert!(SchedulerConfig::default().validate().is_ok());
    }

    #[test]
    fn probe_timeout_must_be_below_interval() {
        let config = SchedulerConfig {
            interval: Duration::from_secs(5),
            probe_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        assert_matches!(
            config.validate(),
            Err(ScheduleError::TimeoutNotBelowInterval { .. })
        );
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config = SchedulerConfig {
            concurrency: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ScheduleError::ZeroConcurrency));
    }

    // -- targets -------------------------------------------------------------

    #[tokio::test]
    async fn equal_probes_emit_nothing_and_flip_emits_once() {
        let h = harness();
        let mut rx = h.bus.subscribe();
        h.store.insert_target(42, "10.0.0.5:22").await.unwrap();
        h.prober.set("10.0.0.5:22", MonitorState::Up);

        // First observation, then an unchanged probe.
        let first = h.scheduler.tick().await;
        assert_eq!(first.probed, 1);
        assert_eq!(first.alerts, 0);
        assert_eq!(h.scheduler.tick().await.alerts, 0);
        assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));

        h.prober.set("10.0.0.5:22", MonitorState::Down);
        assert_eq!(h.scheduler.tick().await.alerts, 1);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.recipient, Some(42));
        assert_eq!(event.previous_state, MonitorState::Up);
        assert_eq!(event.new_state, MonitorState::Down);
        assert!(event.message.starts_with("Target 10.0.0.5:22 changed UP -> DOWN"));

        assert_eq!(h.scheduler.tick().await.alerts, 0);
        assert_eq!(
            h.store.list_targets().await.unwrap()[0].last_state,
            MonitorState::Down
        );
    }

    #[tokio::test]
    async fn failed_write_skips_only_that_target() {
        let h = harness();
        let a = h.store.insert_target(1, "10.0.0.1:22").await.unwrap();
        h.store.insert_target(2, "10.0.0.2:22").await.unwrap();
        h.prober.set("10.0.0.1:22", MonitorState::Up);
        h.prober.set("10.0.0.2:22", MonitorState::Up);
        h.scheduler.tick().await;

        h.store.fail_writes_for(SubjectKey::Target(a.id)).await;
        h.prober.set("10.0.0.1:22", MonitorState::Down);
        h.prober.set("10.0.0.2:22", MonitorState::Down);

        let report = h.scheduler.tick().await;
        assert_eq!(report.failures, 1);
        assert_eq!(report.alerts, 1);
        assert!(!report.aborted);

        let states: Vec<_> = h
            .store
            .list_targets()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.last_state)
            .collect();
        assert_eq!(states, vec![MonitorState::Up, MonitorState::Down]);
    }

    #[tokio::test]
    async fn read_failure_aborts_tick() {
        let h = harness();
        h.store.set_fail_reads(true).await;

        let report = h.scheduler.tick().await;
        assert!(report.aborted);
        assert_eq!(report.failures, 1);
        assert_eq!(report.probed, 0);
        assert_eq!(report.evaluated, 0);
    }

    #[tokio::test]
    async fn probes_respect_concurrency_bound() {
        let prober = FakeProber {
            delay: Duration::from_millis(20),
            ..Default::default()
        };
        let config = SchedulerConfig {
            concurrency: 3,
            ..Default::default()
        };
        let h = harness_with(prober, config);
        for i in 0..12 {
            h.store
                .insert_target(1, &format!("10.0.0.{i}:22"))
                .await
                .unwrap();
        }

        let report = h.scheduler.tick().await;
        assert_eq!(report.probed, 12);
        let max = h.prober.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 3, "max in flight was {max}");
        assert!(max >= 2, "probes did not overlap");
    }

    // -- entities ------------------------------------------------------------

    #[tokio::test]
    async fn entity_flip_alerts_with_issues() {
        let h = harness();
        let mut rx = h.bus.subscribe();

        h.store.upsert_snapshots(&[gpu("gpu-0", 60)]).await.unwrap();
        assert_eq!(h.scheduler.tick().await.evaluated, 1);
        assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));

        h.store.upsert_snapshots(&[gpu("gpu-0", 95)]).await.unwrap();
        assert_eq!(h.scheduler.tick().await.alerts, 1);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.recipient, None);
        assert_eq!(event.new_state, MonitorState::Unhealthy);
        assert!(event.message.ends_with("(overheating)"));

        // Recovery is also a transition.
        h.store.upsert_snapshots(&[gpu("gpu-0", 70)]).await.unwrap();
        assert_eq!(h.scheduler.tick().await.alerts, 1);
        assert_eq!(rx.try_recv().unwrap().new_state, MonitorState::Healthy);
    }

    // -- run loop ------------------------------------------------------------

    #[tokio::test]
    async fn run_ticks_immediately_and_stops_on_cancel() {
        let h = harness();
        h.store.insert_target(1, "10.0.0.5:22").await.unwrap();
        h.prober.set("10.0.0.5:22", MonitorState::Up);

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(h.scheduler.clone().run(cancel.clone()));

        // The first tick records the initial state.
        for _ in 0..100 {
            if h.store.state_writes().await > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(
            h.store.list_targets().await.unwrap()[0].last_state,
            MonitorState::Up
        );

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("scheduler should stop promptly")
            .unwrap();
    }
}
