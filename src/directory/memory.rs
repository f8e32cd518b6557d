use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use anyhow::{Result, anyhow, bail};
use chrono::NaiveDate;

use crate::directory::{LeaveDirectory, ShiftDirectory};
use crate::model::employee::EmployeeId;
use crate::model::leave_request::LeaveInfo;
use crate::model::shift::ShiftDefinition;

#[derive(Default)]
struct Entries {
    standing: HashMap<EmployeeId, ShiftDefinition>,
    overrides: HashMap<(EmployeeId, NaiveDate), ShiftDefinition>,
    flexible_requests: HashMap<(EmployeeId, NaiveDate), ShiftDefinition>,
    leave: HashMap<(EmployeeId, NaiveDate), LeaveInfo>,
    holidays: HashMap<NaiveDate, String>,
}

/// In-memory shift and leave directory for tests and embedding. Clones share
/// the same entries.
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    entries: Arc<RwLock<Entries>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign_standing_shift(&self, employee_id: EmployeeId, shift: ShiftDefinition) {
        self.write().standing.insert(employee_id, shift);
    }

    pub fn override_shift(&self, employee_id: EmployeeId, date: NaiveDate, shift: ShiftDefinition) {
        self.write().overrides.insert((employee_id, date), shift);
    }

    pub fn approve_flexible_request(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
        shift: ShiftDefinition,
    ) {
        self.write().flexible_requests.insert((employee_id, date), shift);
    }

    pub fn set_leave(&self, employee_id: EmployeeId, date: NaiveDate, info: LeaveInfo) {
        self.write().leave.insert((employee_id, date), info);
    }

    pub fn add_holiday(&self, date: NaiveDate, name: impl Into<String>) {
        self.write().holidays.insert(date, name.into());
    }

    /// Makes every lookup fail, to exercise degradation paths.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Entries>> {
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("directory unavailable");
        }
        self.entries
            .read()
            .map_err(|_| anyhow!("directory lock poisoned"))
    }
}

impl ShiftDirectory for InMemoryDirectory {
    async fn shift_override(
        &self,
        employee_id: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<ShiftDefinition>> {
        Ok(self.read()?.overrides.get(&(employee_id.clone(), date)).cloned())
    }

    async fn approved_flexible_request(
        &self,
        employee_id: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<ShiftDefinition>> {
        Ok(self
            .read()?
            .flexible_requests
            .get(&(employee_id.clone(), date))
            .cloned())
    }

    async fn standing_shift(&self, employee_id: &EmployeeId) -> Result<Option<ShiftDefinition>> {
        Ok(self.read()?.standing.get(employee_id).cloned())
    }
}

impl LeaveDirectory for InMemoryDirectory {
    async fn leave_info(&self, employee_id: &EmployeeId, date: NaiveDate) -> Result<Option<LeaveInfo>> {
        Ok(self.read()?.leave.get(&(employee_id.clone(), date)).cloned())
    }

    async fn holiday(&self, date: NaiveDate) -> Result<Option<String>> {
        Ok(self.read()?.holidays.get(&date).cloned())
    }
}
