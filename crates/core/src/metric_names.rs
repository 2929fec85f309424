//! Well-known metric names carried in snapshot metric maps.
//!
//! Ingested GPU and host reports are flattened into a `name -> value` map
//! using these keys; the health rules look values up by the same keys.

/// GPU core temperature in degrees Celsius.
pub const METRIC_TEMPERATURE: &str = "temperature_c";

/// Number of compute processes running on the GPU.
pub const METRIC_PROCESS_COUNT: &str = "process_count";

/// GPU fan speed percentage.
pub const METRIC_FAN_PERCENT: &str = "fan_percent";

/// GPU board power draw in watts.
pub const METRIC_POWER_WATT: &str = "power_watt";

/// GPU memory in use, MiB.
pub const METRIC_GPU_MEMORY_USED: &str = "memory_used_mib";

/// GPU memory capacity, MiB.
pub const METRIC_GPU_MEMORY_TOTAL: &str = "memory_total_mib";

/// GPU compute utilisation percentage.
pub const METRIC_GPU_UTILIZATION: &str = "utilization_gpu_percent";

/// Comma-separated names of processes running on the GPU.
pub const METRIC_PROCESS_NAMES: &str = "process_names";

/// Position of the GPU on its host.
pub const METRIC_GPU_INDEX: &str = "index";

/// Host CPU utilisation percentage.
pub const METRIC_CPU_USAGE: &str = "cpu_usage_percent";

/// Host memory in use, MB.
pub const METRIC_MEMORY_USED: &str = "memory_used_mb";

/// Host memory capacity, MB.
pub const METRIC_MEMORY_TOTAL: &str = "memory_total_mb";

/// Host disk usage as a unit-suffixed size string (e.g. `"40G"`).
pub const METRIC_DISK_USED: &str = "disk_used";

/// Host disk capacity as a unit-suffixed size string (e.g. `"100G"`).
pub const METRIC_DISK_TOTAL: &str = "disk_total";
