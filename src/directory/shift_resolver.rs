use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use moka::future::Cache;
use tracing::{debug, warn};

use crate::directory::ShiftDirectory;
use crate::model::employee::EmployeeId;
use crate::model::shift::{DEFAULT_SHIFT, ShiftDefinition};
use crate::utils::time_reference::date_key;

/// Resolves the effective shift for an employee on a date.
///
/// First match wins: per-date override, approved flexible request, standing
/// shift, then the default morning shift. Never fails; a directory error
/// degrades to the default shift.
pub struct ShiftResolver<D> {
    directory: D,
    cache: Cache<(EmployeeId, NaiveDate), ShiftDefinition>,
}

impl<D: ShiftDirectory> ShiftResolver<D> {
    pub fn new(directory: D, ttl: Duration, capacity: u64) -> Self {
        Self {
            directory,
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub async fn resolve(&self, employee_id: &EmployeeId, date: NaiveDate) -> ShiftDefinition {
        let key = (employee_id.clone(), date);
        if let Some(shift) = self.cache.get(&key).await {
            return shift;
        }

        match self.lookup(employee_id, date).await {
            Ok(shift) => {
                self.cache.insert(key, shift.clone()).await;
                shift
            }
            Err(e) => {
                // not cached, so the next punch retries the directory
                warn!(
                    error = %e,
                    employee_id = %employee_id,
                    date = %date_key(date),
                    "Shift lookup failed, falling back to default shift"
                );
                DEFAULT_SHIFT.clone()
            }
        }
    }

    /// Drops cached resolutions, e.g. after a shift reassignment.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    async fn lookup(&self, employee_id: &EmployeeId, date: NaiveDate) -> Result<ShiftDefinition> {
        if let Some(shift) = self.directory.shift_override(employee_id, date).await? {
            debug!(employee_id = %employee_id, shift = %shift.name, "Using shift override");
            return Ok(shift.normalized());
        }

        if let Some(shift) = self
            .directory
            .approved_flexible_request(employee_id, date)
            .await?
        {
            debug!(employee_id = %employee_id, "Using approved flexible shift");
            return Ok(shift.flexible());
        }

        if let Some(shift) = self.directory.standing_shift(employee_id).await? {
            return Ok(shift.normalized());
        }

        Ok(DEFAULT_SHIFT.clone())
    }
}
