use serde::{Deserialize, Serialize};

/// Day-level aggregate over every employee of an attendance date. Always
/// recomputed from the employees, never edited on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStatistics {
    pub total_employees: u32,
    pub present: u32,
    pub absent: u32,
    pub late: u32,
    pub half_day: u32,
    pub full_day: u32,
    pub on_leave: u32,
    pub on_holiday: u32,

    pub currently_working: u32,
    pub on_break: u32,
    pub finished: u32,

    pub total_work_hours: f64,
    pub total_break_hours: f64,
    pub average_work_hours: f64,
    pub average_break_hours: f64,
    /// "HH:MM"
    pub average_arrival_time: String,
    /// "HH:MM"
    pub average_departure_time: String,

    pub average_punctuality_score: f64,
    pub average_attendance_score: f64,
    pub total_overtime_hours: f64,
}

impl Default for DailyStatistics {
    fn default() -> Self {
        Self {
            total_employees: 0,
            present: 0,
            absent: 0,
            late: 0,
            half_day: 0,
            full_day: 0,
            on_leave: 0,
            on_holiday: 0,
            currently_working: 0,
            on_break: 0,
            finished: 0,
            total_work_hours: 0.0,
            total_break_hours: 0.0,
            average_work_hours: 0.0,
            average_break_hours: 0.0,
            average_arrival_time: "00:00".to_string(),
            average_departure_time: "00:00".to_string(),
            average_punctuality_score: 0.0,
            average_attendance_score: 0.0,
            total_overtime_hours: 0.0,
        }
    }
}
