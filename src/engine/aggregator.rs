use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::model::attendance::{AttendanceStatus, EmployeeDayAttendance};
use crate::model::statistics::DailyStatistics;
use crate::utils::time_reference::{minutes_since_midnight, minutes_to_time_string};

/// Folds every employee's derived fields into day-level statistics.
/// An empty day yields zero counts and zero averages.
pub fn aggregate(employees: &[EmployeeDayAttendance], config: &EngineConfig) -> DailyStatistics {
    let count = |pred: fn(&EmployeeDayAttendance) -> bool| -> u32 {
        employees.iter().filter(|e| pred(e)).count() as u32
    };

    let total_work_hours: f64 = employees.iter().map(|e| e.calculated.work_hours()).sum();
    let total_break_hours: f64 = employees.iter().map(|e| e.calculated.break_hours()).sum();
    let total_overtime_hours: f64 = employees
        .iter()
        .filter(|e| e.calculated.is_overtime)
        .map(|e| (e.calculated.work_hours() - config.max_work_hours).max(0.0))
        .sum();

    let arrivals: Vec<_> = employees.iter().filter_map(|e| e.calculated.arrival_time).collect();
    let departures: Vec<_> = employees.iter().filter_map(|e| e.calculated.departure_time).collect();

    DailyStatistics {
        total_employees: employees.len() as u32,
        present: count(|e| e.calculated.is_present),
        absent: count(|e| e.calculated.is_absent),
        late: count(|e| e.calculated.is_late),
        half_day: count(|e| e.calculated.is_half_day),
        full_day: count(|e| e.calculated.is_full_day),
        on_leave: count(|e| e.leave_info.is_on_leave),
        on_holiday: count(|e| e.leave_info.is_holiday),
        currently_working: count(|e| e.calculated.currently_working),
        on_break: count(|e| e.calculated.on_break),
        finished: count(|e| e.calculated.current_status == AttendanceStatus::Finished),
        total_work_hours,
        total_break_hours,
        average_work_hours: mean(total_work_hours, employees.len()),
        average_break_hours: mean(total_break_hours, employees.len()),
        average_arrival_time: average_time_of_day(&arrivals, config),
        average_departure_time: average_time_of_day(&departures, config),
        average_punctuality_score: mean(
            employees
                .iter()
                .map(|e| f64::from(e.performance.punctuality_score))
                .sum(),
            employees.len(),
        ),
        average_attendance_score: mean(
            employees
                .iter()
                .map(|e| f64::from(e.performance.attendance_score))
                .sum(),
            employees.len(),
        ),
        total_overtime_hours,
    }
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Mean reference-timezone time-of-day as "HH:MM"; "00:00" when empty.
fn average_time_of_day(instants: &[DateTime<Utc>], config: &EngineConfig) -> String {
    let total: f64 = instants
        .iter()
        .map(|i| minutes_since_midnight(config.timezone.time_of_day(*i)))
        .sum();
    minutes_to_time_string(mean(total, instants.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::LeaveInfo;
    use crate::model::punch_event::{EventType, PunchEvent, PunchMetadata};
    use crate::model::shift::StandardShift;
    use chrono::{Duration, NaiveDate, NaiveTime};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn employee(
        id: &str,
        config: &EngineConfig,
        punch_in: Option<(u32, u32)>,
        hours: i64,
    ) -> EmployeeDayAttendance {
        let mut e = EmployeeDayAttendance::new(
            id.into(),
            StandardShift::Morning.definition(),
            LeaveInfo::default(),
        );
        if let Some((h, m)) = punch_in {
            let start = config
                .timezone
                .instant_at(date(), NaiveTime::from_hms_opt(h, m, 0).unwrap());
            e.events
                .push(PunchEvent::new(EventType::PunchIn, start, PunchMetadata::default()));
            e.events.push(PunchEvent::new(
                EventType::PunchOut,
                start + Duration::hours(hours),
                PunchMetadata::default(),
            ));
        }
        let now = config
            .timezone
            .instant_at(date(), NaiveTime::from_hms_opt(23, 0, 0).unwrap());
        e.refresh(date(), now, config);
        e
    }

    #[test]
    fn empty_day_has_zero_averages() {
        let stats = aggregate(&[], &EngineConfig::default());
        assert_eq!(stats, DailyStatistics::default());
        assert_eq!(stats.average_work_hours, 0.0);
        assert!(!stats.average_punctuality_score.is_nan());
    }

    #[test]
    fn counts_and_means_match_individuals() {
        let config = EngineConfig::default();
        let employees = vec![
            employee("A", &config, Some((9, 0)), 9),
            employee("B", &config, Some((9, 30)), 5),
            employee("C", &config, None, 0),
            employee("D", &config, Some((8, 0)), 14),
        ];

        let stats = aggregate(&employees, &config);
        assert_eq!(stats.total_employees, 4);
        assert_eq!(stats.present, 3);
        assert_eq!(stats.absent, 1);
        assert_eq!(stats.late, 1);
        assert_eq!(stats.half_day, 1);
        assert_eq!(stats.full_day, 2);
        assert_eq!(stats.finished, 3);
        assert_eq!(stats.total_work_hours, 28.0);
        assert_eq!(stats.average_work_hours, 7.0);
        assert_eq!(stats.total_overtime_hours, 2.0);
        // (540 + 570 + 480) / 3 = 530 minutes
        assert_eq!(stats.average_arrival_time, "08:50");
        // (18:00 + 14:30 + 22:00) / 3 = 18:10
        assert_eq!(stats.average_departure_time, "18:10");
        // B is 30 minutes late: 100 - 2 * 30 = 40
        assert_eq!(stats.average_punctuality_score, (100.0 + 40.0 + 100.0 + 100.0) / 4.0);
        assert_eq!(stats.average_attendance_score, (100.0 + 50.0 + 0.0 + 100.0) / 4.0);
    }
}
