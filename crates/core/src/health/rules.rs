//! Declarative health rule table.
//!
//! Each [`HealthRule`] pairs a predicate over a snapshot with the issue it
//! raises. Every rule for an entity kind is evaluated (no short-circuit), so
//! one snapshot can report several issues at once, in table order.

use chrono::Duration;

use crate::health::size::size_or_zero;
use crate::metric_names::*;
use crate::snapshot::{EntityKind, MetricSnapshot};
use crate::types::Timestamp;

/// Default freshness window: snapshots older than this are stale.
pub const DEFAULT_STALE_AFTER_SECS: i64 = 300;

/// GPUs at or above this temperature are overheating.
pub const GPU_MAX_TEMPERATURE_C: f64 = 90.0;

/// A GPU with fewer processes than this is idle.
pub const GPU_MIN_PROCESSES: f64 = 1.0;

/// Host CPU usage above this percentage is high.
pub const HOST_CPU_HIGH_PERCENT: f64 = 90.0;

/// Host memory/disk usage above this ratio is high.
pub const HOST_USAGE_HIGH_RATIO: f64 = 0.90;

pub const ISSUE_STALE: &str = "stale data";
pub const ISSUE_NO_PROCESSES: &str = "no active processes";
pub const ISSUE_OVERHEATING: &str = "overheating";
pub const ISSUE_CPU_HIGH: &str = "CPU high";
pub const ISSUE_MEMORY_HIGH: &str = "memory high";
pub const ISSUE_DISK_HIGH: &str = "disk high";

/// Inputs shared by every rule in one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    pub now: Timestamp,
    pub stale_after: Duration,
}

/// A single named check: when `predicate` holds, `message` is an issue.
#[derive(Clone, Copy)]
pub struct HealthRule {
    pub name: &'static str,
    pub message: &'static str,
    predicate: fn(&MetricSnapshot, &RuleContext) -> bool,
}

impl HealthRule {
    pub const fn new(
        name: &'static str,
        message: &'static str,
        predicate: fn(&MetricSnapshot, &RuleContext) -> bool,
    ) -> Self {
        Self {
            name,
            message,
            predicate,
        }
    }

    /// Check the rule against a snapshot, returning the issue if it fires.
    pub fn check(&self, snapshot: &MetricSnapshot, ctx: &RuleContext) -> Option<&'static str> {
        (self.predicate)(snapshot, ctx).then_some(self.message)
    }
}

impl std::fmt::Debug for HealthRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthRule")
            .field("name", &self.name)
            .field("message", &self.message)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Exactly `stale_after` old is still fresh.
fn is_stale(snap: &MetricSnapshot, ctx: &RuleContext) -> bool {
    ctx.now.signed_duration_since(snap.collected_at) > ctx.stale_after
}

fn gpu_has_no_processes(snap: &MetricSnapshot, _: &RuleContext) -> bool {
    snap.number(METRIC_PROCESS_COUNT)
        .is_some_and(|count| count < GPU_MIN_PROCESSES)
}

fn gpu_is_overheating(snap: &MetricSnapshot, _: &RuleContext) -> bool {
    snap.number(METRIC_TEMPERATURE)
        .is_some_and(|temp| temp >= GPU_MAX_TEMPERATURE_C)
}

fn host_cpu_high(snap: &MetricSnapshot, _: &RuleContext) -> bool {
    snap.number(METRIC_CPU_USAGE)
        .is_some_and(|cpu| cpu > HOST_CPU_HIGH_PERCENT)
}

fn host_memory_high(snap: &MetricSnapshot, _: &RuleContext) -> bool {
    match (
        snap.number(METRIC_MEMORY_USED),
        snap.number(METRIC_MEMORY_TOTAL),
    ) {
        (Some(used), Some(total)) => usage_ratio(used, total) > HOST_USAGE_HIGH_RATIO,
        _ => false,
    }
}

fn host_disk_high(snap: &MetricSnapshot, _: &RuleContext) -> bool {
    match (snap.text(METRIC_DISK_USED), snap.text(METRIC_DISK_TOTAL)) {
        (Some(used), Some(total)) => {
            usage_ratio(size_or_zero(used), size_or_zero(total)) > HOST_USAGE_HIGH_RATIO
        }
        _ => false,
    }
}

/// `used / total`, or zero when the total is not positive.
pub fn usage_ratio(used: f64, total: f64) -> f64 {
    if total > 0.0 {
        used / total
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Rule tables
// ---------------------------------------------------------------------------

pub const STALENESS_RULE: HealthRule = HealthRule::new("staleness", ISSUE_STALE, is_stale);

pub const GPU_RULES: &[HealthRule] = &[
    STALENESS_RULE,
    HealthRule::new("gpu_processes", ISSUE_NO_PROCESSES, gpu_has_no_processes),
    HealthRule::new("gpu_temperature", ISSUE_OVERHEATING, gpu_is_overheating),
];

pub const HOST_RULES: &[HealthRule] = &[
    STALENESS_RULE,
    HealthRule::new("host_cpu", ISSUE_CPU_HIGH, host_cpu_high),
    HealthRule::new("host_memory", ISSUE_MEMORY_HIGH, host_memory_high),
    HealthRule::new("host_disk", ISSUE_DISK_HIGH, host_disk_high),
];

/// The rule tables for every entity kind plus the freshness window.
#[derive(Debug, Clone)]
pub struct RuleSet {
    stale_after: Duration,
}

impl RuleSet {
    pub fn new(stale_after: Duration) -> Self {
        Self { stale_after }
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    pub fn rules_for(&self, kind: EntityKind) -> &'static [HealthRule] {
        match kind {
            EntityKind::Gpu => GPU_RULES,
            EntityKind::Host => HOST_RULES,
        }
    }

    /// Evaluate every rule for the snapshot's kind, in table order.
    pub fn evaluate(&self, snapshot: &MetricSnapshot, now: Timestamp) -> Vec<String> {
        let ctx = RuleContext {
            now,
            stale_after: self.stale_after,
        };
        self.rules_for(snapshot.entity_kind)
            .iter()
            .filter_map(|rule| rule.check(snapshot, &ctx))
            .map(str::to_string)
            .collect()
    }

    /// True when `snapshot` is older than the freshness window at `now`.
    pub fn is_stale(&self, snapshot: &MetricSnapshot, now: Timestamp) -> bool {
        is_stale(
            snapshot,
            &RuleContext {
                now,
                stale_after: self.stale_after,
            },
        )
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_STALE_AFTER_SECS))
    }
}

/// Evaluate a snapshot with the default rule set.
pub fn evaluate(snapshot: &MetricSnapshot, now: Timestamp) -> Vec<String> {
    RuleSet::default().evaluate(snapshot, now)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::snapshot::{MetricMap, MetricValue};

    fn gpu(temp: i64, processes: i64, age: Duration) -> (MetricSnapshot, Timestamp) {
        let now = Utc::now();
        let metrics = MetricMap::from([
            (METRIC_TEMPERATURE.to_string(), MetricValue::from(temp)),
            (METRIC_PROCESS_COUNT.to_string(), MetricValue::from(processes)),
        ]);
        (
            MetricSnapshot::new(EntityKind::Gpu, "gpu-0", metrics, now - age),
            now,
        )
    }

    fn host(cpu: f64, mem_used: i64, mem_total: i64, disk_used: &str, disk_total: &str) -> MetricSnapshot {
        let metrics = MetricMap::from([
            (METRIC_CPU_USAGE.to_string(), MetricValue::from(cpu)),
            (METRIC_MEMORY_USED.to_string(), MetricValue::from(mem_used)),
            (METRIC_MEMORY_TOTAL.to_string(), MetricValue::from(mem_total)),
            (METRIC_DISK_USED.to_string(), MetricValue::from(disk_used)),
            (METRIC_DISK_TOTAL.to_string(), MetricValue::from(disk_total)),
        ]);
        MetricSnapshot::new(EntityKind::Host, "node-a", metrics, Utc::now())
    }

    fn ctx(now: Timestamp) -> RuleContext {
        RuleContext {
            now,
            stale_after: Duration::seconds(DEFAULT_STALE_AFTER_SECS),
        }
    }

    #[test]
    fn overheating_gpu_reports_single_issue() {
        let (snap, now) = gpu(95, 2, Duration::zero());
        assert_eq!(evaluate(&snap, now), vec![ISSUE_OVERHEATING]);
    }

    #[test]
    fn healthy_host_reports_nothing() {
        let snap = host(50.0, 40, 100, "10G", "100G");
        assert!(evaluate(&snap, Utc::now()).is_empty());
    }

    #[test]
    fn staleness_cutoff_boundaries() {
        let rule = STALENESS_RULE;

        let (snap, now) = gpu(50, 1, Duration::minutes(10));
        assert_eq!(rule.check(&snap, &ctx(now)), Some(ISSUE_STALE));

        let (snap, now) = gpu(50, 1, Duration::minutes(1));
        assert_eq!(rule.check(&snap, &ctx(now)), None);

        // Exactly at the cutoff is still fresh.
        let (snap, now) = gpu(50, 1, Duration::minutes(5));
        assert_eq!(rule.check(&snap, &ctx(now)), None);

        let (snap, now) = gpu(50, 1, Duration::minutes(5) + Duration::milliseconds(1));
        assert_eq!(rule.check(&snap, &ctx(now)), Some(ISSUE_STALE));
    }

    #[test]
    fn gpu_process_rule_in_isolation() {
        let rule = GPU_RULES[1];
        let (idle, now) = gpu(40, 0, Duration::zero());
        let (busy, _) = gpu(40, 1, Duration::zero());
        assert_eq!(rule.check(&idle, &ctx(now)), Some(ISSUE_NO_PROCESSES));
        assert_eq!(rule.check(&busy, &ctx(now)), None);
    }

    #[test]
    fn gpu_temperature_threshold_is_inclusive() {
        let rule = GPU_RULES[2];
        let (at, now) = gpu(90, 1, Duration::zero());
        let (below, _) = gpu(89, 1, Duration::zero());
        assert_eq!(rule.check(&at, &ctx(now)), Some(ISSUE_OVERHEATING));
        assert_eq!(rule.check(&below, &ctx(now)), None);
    }

    #[test]
    fn host_thresholds_are_exclusive() {
        let now = Utc::now();
        assert!(evaluate(&host(90.0, 90, 100, "90G", "100G"), now).is_empty());
        assert_eq!(
            evaluate(&host(90.5, 91, 100, "91G", "100G"), now),
            vec![ISSUE_CPU_HIGH, ISSUE_MEMORY_HIGH, ISSUE_DISK_HIGH]
        );
    }

    #[test]
    fn all_rules_are_evaluated_in_table_order() {
        let (snap, now) = gpu(99, 0, Duration::minutes(30));
        assert_eq!(
            evaluate(&snap, now),
            vec![ISSUE_STALE, ISSUE_NO_PROCESSES, ISSUE_OVERHEATING]
        );
    }

    #[test]
    fn unparseable_disk_sizes_degrade_to_healthy() {
        let snap = host(10.0, 10, 100, "full", "100G");
        assert!(evaluate(&snap, Utc::now()).is_empty());

        let snap = host(10.0, 10, 100, "99G", "???");
        assert!(evaluate(&snap, Utc::now()).is_empty());
    }

    #[test]
    fn zero_memory_total_is_not_an_issue() {
        let snap = host(10.0, 10, 0, "1G", "100G");
        assert!(evaluate(&snap, Utc::now()).is_empty());
    }

    #[test]
    fn mixed_disk_units_compare_by_bytes() {
        let snap = host(10.0, 10, 100, "950G", "1T");
        assert_eq!(evaluate(&snap, Utc::now()), vec![ISSUE_DISK_HIGH]);
    }

    #[test]
    fn missing_metrics_make_rules_inapplicable() {
        let snap = MetricSnapshot::new(EntityKind::Gpu, "gpu-9", MetricMap::new(), Utc::now());
        assert!(evaluate(&snap, Utc::now()).is_empty());
    }

    #[test]
    fn custom_freshness_window() {
        let rules = RuleSet::new(Duration::seconds(30));
        let (snap, now) = gpu(40, 1, Duration::minutes(1));
        assert_eq!(rules.evaluate(&snap, now), vec![ISSUE_STALE]);
        assert!(rules.is_stale(&snap, now));
    }
}
