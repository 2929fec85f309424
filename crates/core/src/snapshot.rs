//! Metric snapshots for GPUs and hosts.
//!
//! A snapshot is the latest report for one entity, flattened into a
//! `name -> value` map so the health rules can be evaluated uniformly
//! across entity kinds.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::metric_names::*;
use crate::types::Timestamp;

/// The kind of metric-backed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Gpu,
    Host,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Gpu => "gpu",
            EntityKind::Host => "host",
        }
    }

    /// Label used as a prefix for issues and alert messages.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Gpu => "GPU",
            EntityKind::Host => "Host",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown entity kind: {0}")]
pub struct ParseEntityKindError(pub String);

impl FromStr for EntityKind {
    type Err = ParseEntityKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gpu" => Ok(EntityKind::Gpu),
            "host" => Ok(EntityKind::Host),
            other => Err(ParseEntityKindError(other.to_string())),
        }
    }
}

/// Identity of a metric-backed entity: one snapshot per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub entity_id: String,
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.label(), self.entity_id)
    }
}

/// A single reported metric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl MetricValue {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Integer(v) => Some(*v as f64),
            MetricValue::Float(v) => Some(*v),
            MetricValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetricValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Integer(v)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

pub type MetricMap = BTreeMap<String, MetricValue>;

/// Latest metric report for one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSnapshot {
    pub entity_id: String,
    pub entity_kind: EntityKind,
    pub metrics: MetricMap,
    /// Server-side receipt time; caller-supplied timestamps are ignored.
    pub collected_at: Timestamp,
}

impl MetricSnapshot {
    pub fn new(
        entity_kind: EntityKind,
        entity_id: impl Into<String>,
        metrics: MetricMap,
        collected_at: Timestamp,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            entity_kind,
            metrics,
            collected_at,
        }
    }

    pub fn key(&self) -> EntityKey {
        EntityKey {
            kind: self.entity_kind,
            entity_id: self.entity_id.clone(),
        }
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).and_then(MetricValue::as_f64)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.metrics.get(name).and_then(MetricValue::as_text)
    }
}

// ---------------------------------------------------------------------------
// Ingestion payloads
// ---------------------------------------------------------------------------

/// One GPU as reported by a GPU agent.
///
/// Any `updated_at` field sent by the agent is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct GpuReport {
    #[serde(default)]
    pub index: i64,
    pub name: String,
    #[serde(default)]
    pub fan_percent: i64,
    pub temperature_c: i64,
    #[serde(default)]
    pub power_watt: f64,
    #[serde(default)]
    pub memory_used_mib: i64,
    #[serde(default)]
    pub memory_total_mib: i64,
    #[serde(default)]
    pub utilization_gpu_percent: i64,
    pub process_count: i64,
    #[serde(default)]
    pub process_names: String,
}

impl GpuReport {
    pub fn into_snapshot(self, collected_at: Timestamp) -> MetricSnapshot {
        let metrics = MetricMap::from([
            (METRIC_GPU_INDEX.to_string(), self.index.into()),
            (METRIC_FAN_PERCENT.to_string(), self.fan_percent.into()),
            (METRIC_TEMPERATURE.to_string(), self.temperature_c.into()),
            (METRIC_POWER_WATT.to_string(), self.power_watt.into()),
            (METRIC_GPU_MEMORY_USED.to_string(), self.memory_used_mib.into()),
            (METRIC_GPU_MEMORY_TOTAL.to_string(), self.memory_total_mib.into()),
            (
                METRIC_GPU_UTILIZATION.to_string(),
                self.utilization_gpu_percent.into(),
            ),
            (METRIC_PROCESS_COUNT.to_string(), self.process_count.into()),
            (METRIC_PROCESS_NAMES.to_string(), self.process_names.into()),
        ]);
        MetricSnapshot::new(EntityKind::Gpu, self.name, metrics, collected_at)
    }
}

/// Usage figures reported by a host agent.
#[derive(Debug, Clone, Deserialize)]
pub struct HostReport {
    pub hostname: String,
    pub cpu_usage_percent: f64,
    pub memory_used_mb: i64,
    pub memory_total_mb: i64,
    /// Unit-suffixed size, e.g. `"40G"`.
    pub disk_used: String,
    /// Unit-suffixed size, e.g. `"100G"`.
    pub disk_total: String,
}

impl HostReport {
    pub fn into_snapshot(self, collected_at: Timestamp) -> MetricSnapshot {
        let metrics = MetricMap::from([
            (METRIC_CPU_USAGE.to_string(), self.cpu_usage_percent.into()),
            (METRIC_MEMORY_USED.to_string(), self.memory_used_mb.into()),
            (METRIC_MEMORY_TOTAL.to_string(), self.memory_total_mb.into()),
            (METRIC_DISK_USED.to_string(), self.disk_used.into()),
            (METRIC_DISK_TOTAL.to_string(), self.disk_total.into()),
        ]);
        MetricSnapshot::new(EntityKind::Host, self.hostname, metrics, collected_at)
    }
}
