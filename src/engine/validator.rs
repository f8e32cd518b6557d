//! Punch validation: the attendance state machine plus timing guards.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::config::EngineConfig;
use crate::engine::attribution;
use crate::error::ValidationError;
use crate::model::attendance::{AttendanceStatus, EmployeeDayAttendance};
use crate::model::punch_event::{EventType, PunchEvent};

/// States from which `event` may be recorded.
pub fn expected_states(event: EventType) -> &'static [AttendanceStatus] {
    match event {
        EventType::PunchIn => &[AttendanceStatus::NotStarted],
        EventType::BreakStart => &[AttendanceStatus::Working],
        EventType::BreakEnd => &[AttendanceStatus::OnBreak],
        EventType::PunchOut => &[AttendanceStatus::Working, AttendanceStatus::OnBreak],
    }
}

/// Transition table over every (state, event) pair.
pub fn next_status(
    current: AttendanceStatus,
    event: EventType,
) -> Result<AttendanceStatus, ValidationError> {
    use AttendanceStatus::*;

    match (current, event) {
        (NotStarted, EventType::PunchIn) => Ok(Working),
        (Working, EventType::BreakStart) => Ok(OnBreak),
        (OnBreak, EventType::BreakEnd) => Ok(Working),
        (Working | OnBreak, EventType::PunchOut) => Ok(Finished),
        (actual, event) => Err(ValidationError::StateViolation {
            event,
            expected: expected_states(event),
            actual,
        }),
    }
}

/// Status after replaying `events` in timestamp order.
pub fn status_after(events: &[PunchEvent]) -> AttendanceStatus {
    let mut ordered: Vec<&PunchEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.timestamp);

    ordered
        .into_iter()
        .fold(AttendanceStatus::NotStarted, |status, event| {
            next_status(status, event.event_type).unwrap_or(status)
        })
}

/// Checks a proposed event against the employee's day.
///
/// `now` is the validation time; `timestamp` differs from it only for manual
/// entries. Returns the status the employee moves to.
pub fn validate_punch(
    employee: &EmployeeDayAttendance,
    event: EventType,
    timestamp: DateTime<Utc>,
    attendance_date: NaiveDate,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<AttendanceStatus, ValidationError> {
    let last = employee.last_event();

    // double submit
    if let Some(last) = last {
        let within_window = Duration::try_seconds(config.duplicate_window_seconds)
            .is_some_and(|window| timestamp - last.timestamp < window);
        if last.event_type == event && within_window {
            return Err(ValidationError::DuplicateEvent {
                event,
                window_seconds: config.duplicate_window_seconds,
            });
        }
    }

    let next = next_status(status_after(&employee.events), event)?;

    // windows too wide for the calendar leave that side open
    let earliest = Duration::try_hours(config.max_past_hours)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let latest = Duration::try_minutes(config.max_future_minutes)
        .and_then(|window| now.checked_add_signed(window))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    if timestamp < earliest || timestamp > latest {
        return Err(ValidationError::TimestampOutOfRange {
            timestamp,
            earliest,
            latest,
        });
    }

    if let Some(last) = last {
        if timestamp < last.timestamp {
            return Err(ValidationError::EventOutOfOrder {
                attempted: timestamp,
                last: last.timestamp,
            });
        }
    }

    if event == EventType::PunchIn && !employee.assigned_shift.is_flexible {
        check_early_punch_in(employee, timestamp, attendance_date, config)?;
    }

    Ok(next)
}

fn check_early_punch_in(
    employee: &EmployeeDayAttendance,
    timestamp: DateTime<Utc>,
    attendance_date: NaiveDate,
    config: &EngineConfig,
) -> Result<(), ValidationError> {
    let shift = &employee.assigned_shift;
    let start = attribution::shift_start(&config.timezone, attendance_date, shift);
    let Some(earliest_allowed) = Duration::try_minutes(config.early_punch_in_window_minutes)
        .and_then(|window| start.checked_sub_signed(window))
    else {
        return Ok(());
    };

    if timestamp < earliest_allowed {
        return Err(ValidationError::EarlyPunchInRejected {
            earliest_allowed: config.timezone.localize(earliest_allowed),
            shift_start: shift.start,
            window_minutes: config.early_punch_in_window_minutes,
        });
    }
    Ok(())
}
