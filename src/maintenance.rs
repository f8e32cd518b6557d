//! Offline recalculation of stored attendance, e.g. after a rule change.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::{AttendanceError, Result};
use crate::store::AttendanceStore;
use crate::utils::time_reference::date_key;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecalculationReport {
    pub records: u32,
    pub employees: u32,
    /// Employees whose late flag flipped.
    pub late_changed: u32,
}

/// Replays every employee of every record in `[start, end]` against `now`
/// and writes the results back. Shift snapshots are left as they are.
pub async fn recalculate_range<S: AttendanceStore>(
    store: &S,
    start: NaiveDate,
    end: NaiveDate,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<RecalculationReport> {
    if start > end {
        return Err(AttendanceError::InvalidRange { start, end });
    }

    let mut report = RecalculationReport::default();
    for mut record in store.find_range(start, end).await? {
        let was_late: Vec<bool> = record
            .employees
            .iter()
            .map(|e| e.calculated.is_late)
            .collect();

        record.refresh_all(now, config);

        report.records += 1;
        report.employees += record.employees.len() as u32;
        report.late_changed += record
            .employees
            .iter()
            .zip(was_late)
            .filter(|(e, before)| e.calculated.is_late != *before)
            .count() as u32;

        match store.save(&record).await {
            Ok(_) => info!(date = %date_key(record.date), employees = record.employees.len(), "Record recalculated"),
            Err(e) => {
                warn!(date = %date_key(record.date), error = %e, "Failed to save recalculated record");
                return Err(e.into());
            }
        }
    }

    Ok(report)
}
