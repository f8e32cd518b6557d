use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::config::EngineConfig;
use crate::engine::{aggregator, recalculation};
use crate::model::employee::EmployeeId;
use crate::model::leave_request::{LeaveInfo, SpecialDayInfo};
use crate::model::punch_event::PunchEvent;
use crate::model::shift::ShiftDefinition;
use crate::model::statistics::DailyStatistics;

/// Where an employee stands within their attendance day.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    #[default]
    NotStarted,
    Working,
    OnBreak,
    Finished,
}

/// Everything derived from an employee's events for one attendance date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedAttendance {
    pub arrival_time: Option<DateTime<Utc>>,
    pub departure_time: Option<DateTime<Utc>>,

    pub work_duration_seconds: i64,
    pub break_duration_seconds: i64,
    /// work + break
    pub total_duration_seconds: i64,
    pub work_duration: String,
    pub break_duration: String,
    pub total_duration: String,

    pub is_present: bool,
    pub is_absent: bool,
    pub is_late: bool,
    pub late_minutes: i64,
    pub is_half_day: bool,
    pub is_full_day: bool,
    pub is_overtime: bool,
    pub is_wfh: bool,
    pub is_paid_leave: bool,

    pub currently_working: bool,
    pub on_break: bool,
    pub current_status: AttendanceStatus,

    pub total_work_sessions: u32,
    pub total_break_sessions: u32,
    pub longest_work_session: i64,
    pub longest_break_session: i64,
}

impl Default for CalculatedAttendance {
    fn default() -> Self {
        Self {
            arrival_time: None,
            departure_time: None,
            work_duration_seconds: 0,
            break_duration_seconds: 0,
            total_duration_seconds: 0,
            work_duration: "0h 0m".to_string(),
            break_duration: "0h 0m".to_string(),
            total_duration: "0h 0m".to_string(),
            is_present: false,
            is_absent: true,
            is_late: false,
            late_minutes: 0,
            is_half_day: false,
            is_full_day: false,
            is_overtime: false,
            is_wfh: false,
            is_paid_leave: false,
            currently_working: false,
            on_break: false,
            current_status: AttendanceStatus::NotStarted,
            total_work_sessions: 0,
            total_break_sessions: 0,
            longest_work_session: 0,
            longest_break_session: 0,
        }
    }
}

impl CalculatedAttendance {
    pub fn work_hours(&self) -> f64 {
        self.work_duration_seconds as f64 / 3600.0
    }

    pub fn break_hours(&self) -> f64 {
        self.break_duration_seconds as f64 / 3600.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    /// 0-100
    pub punctuality_score: u32,
    /// 0-100
    pub attendance_score: u32,
    pub productivity_hours: f64,
    /// 1-5, 0 until first calculated
    pub efficiency_rating: f64,
}

/// One employee's attendance for one date. Owned by its [`AttendanceDateRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDayAttendance {
    pub employee_id: EmployeeId,
    pub events: Vec<PunchEvent>,
    pub calculated: CalculatedAttendance,
    /// Frozen when the day is created so later reassignment leaves history alone.
    pub assigned_shift: ShiftDefinition,
    pub leave_info: LeaveInfo,
    pub performance: Performance,
}

impl EmployeeDayAttendance {
    pub fn new(employee_id: EmployeeId, assigned_shift: ShiftDefinition, leave_info: LeaveInfo) -> Self {
        Self {
            employee_id,
            events: Vec::new(),
            calculated: CalculatedAttendance::default(),
            assigned_shift,
            leave_info,
            performance: Performance::default(),
        }
    }

    pub fn last_event(&self) -> Option<&PunchEvent> {
        self.events.iter().max_by_key(|e| e.timestamp)
    }

    /// Replays `events` and overwrites every derived field.
    pub fn refresh(&mut self, attendance_date: NaiveDate, now: DateTime<Utc>, config: &EngineConfig) {
        let derived = recalculation::recalculate(
            &self.events,
            attendance_date,
            &self.assigned_shift,
            &self.leave_info,
            now,
            config,
        );
        self.calculated = derived.calculated;
        self.performance = derived.performance;
    }
}

/// All employees' attendance for one reference-timezone calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceDateRecord {
    pub date: NaiveDate,
    pub employees: Vec<EmployeeDayAttendance>,
    pub daily_statistics: DailyStatistics,
    pub special_day: SpecialDayInfo,
    /// Optimistic-concurrency token; 0 means never persisted.
    #[serde(default)]
    pub version: u64,
}

impl AttendanceDateRecord {
    pub fn new(date: NaiveDate, special_day: SpecialDayInfo) -> Self {
        Self {
            date,
            employees: Vec::new(),
            daily_statistics: DailyStatistics::default(),
            special_day,
            version: 0,
        }
    }

    pub fn employee(&self, employee_id: &EmployeeId) -> Option<&EmployeeDayAttendance> {
        self.employees.iter().find(|e| &e.employee_id == employee_id)
    }

    /// Replaces the entry for the same employee, or appends a new one.
    pub fn upsert_employee(&mut self, entry: EmployeeDayAttendance) -> &mut EmployeeDayAttendance {
        match self
            .employees
            .iter()
            .position(|e| e.employee_id == entry.employee_id)
        {
            Some(index) => {
                self.employees[index] = entry;
                &mut self.employees[index]
            }
            None => {
                self.employees.push(entry);
                let last = self.employees.len() - 1;
                &mut self.employees[last]
            }
        }
    }

    pub fn refresh_statistics(&mut self, config: &EngineConfig) {
        self.daily_statistics = aggregator::aggregate(&self.employees, config);
    }

    /// Recalculates every employee against `now`, then the statistics.
    pub fn refresh_all(&mut self, now: DateTime<Utc>, config: &EngineConfig) {
        let date = self.date;
        for employee in &mut self.employees {
            employee.refresh(date, now, config);
        }
        self.refresh_statistics(config);
    }
}
