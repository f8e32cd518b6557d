use crate::model::report::{DailySnapshot, DayAttendance, PeriodSummary, PeriodTotals};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percent(part: u32, whole: u32) -> u32 {
    (f64::from(part) / f64::from(whole) * 100.0).round() as u32
}

/// Totals and rates over one employee's days.
pub fn period_summary(days: &[DayAttendance]) -> PeriodSummary {
    if days.is_empty() {
        return PeriodSummary::default();
    }

    let total_days = days.len() as u32;
    let present_days = days.iter().filter(|d| d.calculated.is_present).count() as u32;
    let absent_days = days.iter().filter(|d| d.calculated.is_absent).count() as u32;
    let late_days = days.iter().filter(|d| d.calculated.is_late).count() as u32;
    let total_hours: f64 = days.iter().map(|d| d.calculated.work_hours()).sum();

    PeriodSummary {
        total_days,
        present_days,
        absent_days,
        late_days,
        total_hours: round2(total_hours),
        average_hours: round2(total_hours / f64::from(total_days)),
        attendance_rate: percent(present_days, total_days),
        punctuality_rate: if present_days > 0 {
            percent(present_days.saturating_sub(late_days), present_days)
        } else {
            100
        },
    }
}

/// Totals across several days of statistics.
pub fn period_totals(daily: &[DailySnapshot]) -> PeriodTotals {
    let days = daily.len();
    let rate = |f: fn(&DailySnapshot) -> f64| -> f64 {
        if days == 0 {
            0.0
        } else {
            daily.iter().map(f).sum::<f64>() / days as f64 * 100.0
        }
    };

    PeriodTotals {
        total_work_days: days as u32,
        total_employee_days: daily.iter().map(|d| d.employee_count).sum(),
        total_present_days: daily.iter().map(|d| d.statistics.present).sum(),
        total_absent_days: daily.iter().map(|d| d.statistics.absent).sum(),
        total_late_days: daily.iter().map(|d| d.statistics.late).sum(),
        total_work_hours: daily.iter().map(|d| d.statistics.total_work_hours).sum(),
        average_attendance_rate: rate(|d| {
            f64::from(d.statistics.present) / f64::from(d.statistics.total_employees.max(1))
        }),
        average_punctuality_rate: rate(|d| {
            f64::from(d.statistics.present.saturating_sub(d.statistics.late))
                / f64::from(d.statistics.present.max(1))
        }),
    }
}
