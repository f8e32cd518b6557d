//! Employee/shift and leave/holiday directories consumed by the engine.
//!
//! Lookups return `anyhow::Result`: the engine only cares whether a lookup
//! failed so it can degrade to a safe default.

pub mod leave_resolver;
pub mod memory;
pub mod shift_resolver;

use anyhow::Result;
use chrono::NaiveDate;

use crate::model::employee::EmployeeId;
use crate::model::leave_request::LeaveInfo;
use crate::model::shift::ShiftDefinition;

pub use leave_resolver::LeaveResolver;
pub use memory::InMemoryDirectory;
pub use shift_resolver::ShiftResolver;

#[allow(async_fn_in_trait)]
pub trait ShiftDirectory: Send + Sync {
    /// Per-date override for this employee.
    async fn shift_override(
        &self,
        employee_id: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<ShiftDefinition>>;

    /// Approved ad-hoc flexible-shift request covering `date`.
    async fn approved_flexible_request(
        &self,
        employee_id: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<ShiftDefinition>>;

    /// The employee's currently assigned standing shift.
    async fn standing_shift(&self, employee_id: &EmployeeId) -> Result<Option<ShiftDefinition>>;
}

#[allow(async_fn_in_trait)]
pub trait LeaveDirectory: Send + Sync {
    /// Approved leave / work-from-home status; `None` when nothing applies.
    async fn leave_info(&self, employee_id: &EmployeeId, date: NaiveDate) -> Result<Option<LeaveInfo>>;

    /// Holiday name when `date` is a holiday.
    async fn holiday(&self, date: NaiveDate) -> Result<Option<String>>;
}
