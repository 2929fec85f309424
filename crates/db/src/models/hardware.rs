//! Hardware inventory reports pushed by host agents.
//!
//! These are stored for display only and never feed the health rules.

use healthwatch_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `hardware_reports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HardwareReport {
    pub hostname: String,
    pub uptime: String,
    pub kernel: String,
    pub distro: String,
    pub cpu: String,
    pub memory: String,
    #[sqlx(rename = "disk_json")]
    pub disk: Json<serde_json::Value>,
    pub pci: String,
    pub usb: String,
    #[sqlx(rename = "network_json")]
    pub network: Json<serde_json::Value>,
    pub storage: String,
    pub updated_at: Timestamp,
}

/// DTO for upserting a hardware report. Missing fields default to empty.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertHardwareReport {
    pub hostname: String,
    #[serde(default)]
    pub uptime: String,
    #[serde(default)]
    pub kernel: String,
    #[serde(default)]
    pub distro: String,
    #[serde(default)]
    pub cpu: String,
    #[serde(default)]
    pub memory: String,
    #[serde(default)]
    pub disk: serde_json::Value,
    #[serde(default)]
    pub pci: String,
    #[serde(default)]
    pub usb: String,
    #[serde(default)]
    pub network: serde_json::Value,
    #[serde(default)]
    pub storage: String,
}
