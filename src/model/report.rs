use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::attendance::{CalculatedAttendance, EmployeeDayAttendance, Performance};
use crate::model::employee::EmployeeId;
use crate::model::leave_request::{LeaveInfo, SpecialDayInfo};
use crate::model::punch_event::PunchEvent;
use crate::model::shift::ShiftDefinition;
use crate::model::statistics::DailyStatistics;

/// Returned once a punch has been validated, appended and persisted.
#[derive(Debug, Clone, Serialize)]
pub struct PunchOutcome {
    /// The date record the event was attributed to.
    pub attendance_date: NaiveDate,
    pub employee: EmployeeDayAttendance,
    pub event: PunchEvent,
    pub message: &'static str,
}

/// One day of an employee's history, recomputed against "now".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayAttendance {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub calculated: CalculatedAttendance,
    pub events: Vec<PunchEvent>,
    pub shift: ShiftDefinition,
    pub leave: LeaveInfo,
    pub performance: Performance,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub total_days: u32,
    pub present_days: u32,
    pub absent_days: u32,
    pub late_days: u32,
    /// Rounded to two decimals
    pub total_hours: f64,
    pub average_hours: f64,
    /// Whole percent
    pub attendance_rate: u32,
    pub punctuality_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeAttendanceReport {
    pub employee_id: EmployeeId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<DayAttendance>,
    pub summary: PeriodSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub statistics: DailyStatistics,
    pub special_day: SpecialDayInfo,
    pub employees: Vec<EmployeeDayAttendance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    pub statistics: DailyStatistics,
    pub employee_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub total_work_days: u32,
    pub total_employee_days: u32,
    pub total_present_days: u32,
    pub total_absent_days: u32,
    pub total_late_days: u32,
    pub total_work_hours: f64,
    /// Percent
    pub average_attendance_rate: f64,
    /// Percent
    pub average_punctuality_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily: Vec<DailySnapshot>,
    pub totals: PeriodTotals,
}
