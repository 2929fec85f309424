//! Aggregate health over every known entity.

use serde::Serialize;

use crate::health::rules::RuleSet;
use crate::snapshot::{EntityKey, MetricSnapshot};
use crate::state::MonitorState;
use crate::types::Timestamp;

/// Overall status reported by the health summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Unhealthy,
}

/// Result of evaluating one entity's snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityAssessment {
    pub key: EntityKey,
    pub issues: Vec<String>,
    pub state: MonitorState,
}

impl EntityAssessment {
    pub fn assess(snapshot: &MetricSnapshot, rules: &RuleSet, now: Timestamp) -> Self {
        let issues = rules.evaluate(snapshot, now);
        Self {
            key: snapshot.key(),
            state: MonitorState::from_issue_count(issues.len()),
            issues,
        }
    }

    /// Issues prefixed with the entity identity, e.g. `"GPU gpu-0: overheating"`.
    pub fn labelled_issues(&self) -> impl Iterator<Item = String> + '_ {
        self.issues
            .iter()
            .map(move |issue| format!("{}: {issue}", self.key))
    }
}

/// Body of the health summary endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSummary {
    pub status: OverallStatus,
    pub issues: Vec<String>,
}

impl HealthSummary {
    pub fn is_healthy(&self) -> bool {
        self.status == OverallStatus::Healthy
    }
}

/// Evaluate every snapshot and fold the results into one summary.
///
/// Issues are ordered GPUs first, then hosts, each group by entity id.
pub fn summarize(snapshots: &[MetricSnapshot], rules: &RuleSet, now: Timestamp) -> HealthSummary {
    let mut assessments: Vec<EntityAssessment> = snapshots
        .iter()
        .map(|snap| EntityAssessment::assess(snap, rules, now))
        .collect();
    assessments.sort_by(|a, b| a.key.cmp(&b.key));

    let issues: Vec<String> = assessments
        .iter()
        .flat_map(|a| a.labelled_issues())
        .collect();

    HealthSummary {
        status: if issues.is_empty() {
            OverallStatus::Healthy
        } else {
            OverallStatus::Unhealthy
        },
        issues,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::metric_names::*;
    use crate::snapshot::{EntityKind, MetricMap, MetricValue};

    fn gpu(name: &str, temp: i64, processes: i64, at: Timestamp) -> MetricSnapshot {
        let metrics = MetricMap::from([
            (METRIC_TEMPERATURE.to_string(), MetricValue::from(temp)),
            (METRIC_PROCESS_COUNT.to_string(), MetricValue::from(processes)),
        ]);
        MetricSnapshot::new(EntityKind::Gpu, name, metrics, at)
    }

    fn host(name: &str, cpu: f64, at: Timestamp) -> MetricSnapshot {
        let metrics = MetricMap::from([
            (METRIC_CPU_USAGE.to_string(), MetricValue::from(cpu)),
            (METRIC_MEMORY_USED.to_string(), MetricValue::from(40_i64)),
            (METRIC_MEMORY_TOTAL.to_string(), MetricValue::from(100_i64)),
            (METRIC_DISK_USED.to_string(), MetricValue::from("10G")),
            (METRIC_DISK_TOTAL.to_string(), MetricValue::from("100G")),
        ]);
        MetricSnapshot::new(EntityKind::Host, name, metrics, at)
    }

    #[test]
    fn empty_inventory_is_healthy() {
        let summary = summarize(&[], &RuleSet::default(), Utc::now());
        assert!(summary.is_healthy());
        assert!(summary.issues.is_empty());
    }

    #[test]
    fn issues_are_ordered_gpus_then_hosts() {
        let now = Utc::now();
        let snaps = vec![
            host("node-b", 99.0, now),
            gpu("gpu-1", 95, 1, now),
            host("node-a", 50.0, now - Duration::minutes(10)),
            gpu("gpu-0", 40, 0, now),
        ];
        let summary = summarize(&snaps, &RuleSet::default(), now);

        assert_eq!(summary.status, OverallStatus::Unhealthy);
        assert_eq!(
            summary.issues,
            vec![
                "GPU gpu-0: no active processes",
                "GPU gpu-1: overheating",
                "Host node-a: stale data",
                "Host node-b: CPU high",
            ]
        );
    }

    #[test]
    fn adding_then_removing_a_failing_metric_flips_aggregate() {
        let now = Utc::now();
        let rules = RuleSet::default();
        let mut snaps = vec![gpu("gpu-0", 60, 1, now), host("node-a", 20.0, now)];
        assert!(summarize(&snaps, &rules, now).is_healthy());

        snaps.push(gpu("gpu-1", 93, 1, now));
        assert!(!summarize(&snaps, &rules, now).is_healthy());

        snaps.pop();
        assert!(summarize(&snaps, &rules, now).is_healthy());
    }

    #[test]
    fn one_failing_metric_on_a_snapshot_flips_health_both_ways() {
        let now = Utc::now();
        let rules = RuleSet::default();
        let mut snaps = vec![gpu("gpu-0", 50, 1, now), host("node-a", 20.0, now)];
        assert!(summarize(&snaps, &rules, now).is_healthy());

        snaps[0]
            .metrics
            .insert(METRIC_PROCESS_COUNT.to_string(), MetricValue::from(0_i64));
        let assessment = EntityAssessment::assess(&snaps[0], &rules, now);
        assert_eq!(assessment.state, MonitorState::Unhealthy);
        assert_eq!(assessment.issues, vec!["no active processes"]);
        let summary = summarize(&snaps, &rules, now);
        assert_eq!(summary.status, OverallStatus::Unhealthy);
        assert_eq!(summary.issues, vec!["GPU gpu-0: no active processes"]);

        snaps[0]
            .metrics
            .insert(METRIC_PROCESS_COUNT.to_string(), MetricValue::from(1_i64));
        assert_eq!(
            EntityAssessment::assess(&snaps[0], &rules, now).state,
            MonitorState::Healthy
        );
        assert!(summarize(&snaps, &rules, now).is_healthy());
    }

    #[test]
    fn assessment_maps_issues_to_state() {
        let now = Utc::now();
        let hot = EntityAssessment::assess(&gpu("gpu-0", 95, 2, now), &RuleSet::default(), now);
        assert_eq!(hot.issues, vec!["overheating"]);
        assert_eq!(hot.state, MonitorState::Unhealthy);

        let fine = EntityAssessment::assess(&host("node-a", 50.0, now), &RuleSet::default(), now);
        assert_eq!(fine.state, MonitorState::Healthy);
    }
}
