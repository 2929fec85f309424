//! Repository for the `hardware_reports` table.

use healthwatch_core::types::Timestamp;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::hardware::{HardwareReport, UpsertHardwareReport};

/// Column list for `hardware_reports` SELECT queries.
const COLUMNS: &str = "\
    hostname, uptime, kernel, distro, cpu, memory, disk_json, \
    pci, usb, network_json, storage, updated_at";

/// Provides query operations for hardware inventory reports.
pub struct HardwareReportRepo;

impl HardwareReportRepo {
    /// Insert or replace the report for `report.hostname`.
    pub async fn upsert(
        pool: &SqlitePool,
        report: &UpsertHardwareReport,
        now: Timestamp,
    ) -> Result<HardwareReport, sqlx::Error> {
        let query = format!(
            "INSERT INTO hardware_reports ({COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (hostname) DO UPDATE SET \
                 uptime = excluded.uptime, \
                 kernel = excluded.kernel, \
                 distro = excluded.distro, \
                 cpu = excluded.cpu, \
                 memory = excluded.memory, \
                 disk_json = excluded.disk_json, \
                 pci = excluded.pci, \
                 usb = excluded.usb, \
                 network_json = excluded.network_json, \
                 storage = excluded.storage, \
                 updated_at = excluded.updated_at \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HardwareReport>(&query)
            .bind(&report.hostname)
            .bind(&report.uptime)
            .bind(&report.kernel)
            .bind(&report.distro)
            .bind(&report.cpu)
            .bind(&report.memory)
            .bind(Json(&report.disk))
            .bind(&report.pci)
            .bind(&report.usb)
            .bind(Json(&report.network))
            .bind(&report.storage)
            .bind(now)
            .fetch_one(pool)
            .await
    }

    /// List all reports ordered by hostname.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<HardwareReport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hardware_reports ORDER BY hostname");
        sqlx::query_as::<_, HardwareReport>(&query)
            .fetch_all(pool)
            .await
    }
}
