//! Night-shift date attribution.
//!
//! A punch belongs to the attendance date of the shift it is part of, which for
//! a shift crossing midnight is not always the calendar date it happened on.

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::model::shift::ShiftDefinition;
use crate::utils::time_reference::ReferenceTimezone;

/// Attendance date for a punch at `instant` under `shift`.
///
/// On a crossing shift (e.g. 20:00 -> 05:00), anything at or before the end
/// time-of-day is the tail of the previous night and goes to yesterday; the
/// start of tonight's shift and the off hours in between stay on today.
pub fn attribute_date(
    timezone: &ReferenceTimezone,
    instant: DateTime<Utc>,
    shift: &ShiftDefinition,
) -> NaiveDate {
    let local = timezone.localize(instant);
    let date = local.date_naive();

    if shift.crosses_midnight() && local.time() <= shift.end {
        date.pred_opt().unwrap_or(date)
    } else {
        date
    }
}

pub fn belongs_to(
    timezone: &ReferenceTimezone,
    instant: DateTime<Utc>,
    shift: &ShiftDefinition,
    attendance_date: NaiveDate,
) -> bool {
    attribute_date(timezone, instant, shift) == attendance_date
}

/// Nominal start of `shift` on `attendance_date`.
pub fn shift_start(
    timezone: &ReferenceTimezone,
    attendance_date: NaiveDate,
    shift: &ShiftDefinition,
) -> DateTime<Utc> {
    timezone.instant_at(attendance_date, shift.start)
}

/// Last instant that still attributes to `attendance_date`: the shift end on
/// the following morning for crossing shifts, midnight otherwise.
pub fn attribution_window_end(
    timezone: &ReferenceTimezone,
    attendance_date: NaiveDate,
    shift: &ShiftDefinition,
) -> DateTime<Utc> {
    let next = attendance_date
        .checked_add_days(Days::new(1))
        .unwrap_or(attendance_date);

    if shift.crosses_midnight() {
        timezone.instant_at(next, shift.end)
    } else {
        timezone.start_of_day(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::shift::StandardShift;
    use chrono::NaiveTime;

    fn at(tz: &ReferenceTimezone, date: NaiveDate, h: u32, m: u32) -> DateTime<Utc> {
        tz.instant_at(date, NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn night_shift_attribution_is_symmetric_around_midnight() {
        let tz = ReferenceTimezone::default();
        let night = StandardShift::Night.definition();

        assert_eq!(attribute_date(&tz, at(&tz, day(10), 23, 30), &night), day(10));
        assert_eq!(attribute_date(&tz, at(&tz, day(11), 2, 0), &night), day(10));
        assert_eq!(attribute_date(&tz, at(&tz, day(11), 6, 0), &night), day(11));
    }

    #[test]
    fn night_shift_boundaries() {
        let tz = ReferenceTimezone::default();
        let night = StandardShift::Night.definition();

        // exactly the end time still closes last night
        assert_eq!(attribute_date(&tz, at(&tz, day(11), 5, 0), &night), day(10));
        // one second later is today's off hours
        let just_after = at(&tz, day(11), 5, 0) + chrono::Duration::seconds(1);
        assert_eq!(attribute_date(&tz, just_after, &night), day(11));
        // off hours and the start itself are today
        assert_eq!(attribute_date(&tz, at(&tz, day(11), 15, 0), &night), day(11));
        assert_eq!(attribute_date(&tz, at(&tz, day(11), 20, 0), &night), day(11));
    }

    #[test]
    fn day_shift_uses_the_reference_calendar_date() {
        let tz = ReferenceTimezone::default();
        let morning = StandardShift::Morning.definition();

        // 00:10 IST on the 11th is still the 10th in UTC
        let instant = at(&tz, day(11), 0, 10);
        assert_eq!(instant.date_naive(), day(10));
        assert_eq!(attribute_date(&tz, instant, &morning), day(11));
    }

    #[test]
    fn window_end_matches_attribution() {
        let tz = ReferenceTimezone::default();
        let night = StandardShift::Night.definition();
        let morning = StandardShift::Morning.definition();

        let end = attribution_window_end(&tz, day(10), &night);
        assert!(belongs_to(&tz, end, &night, day(10)));
        assert!(!belongs_to(&tz, end + chrono::Duration::seconds(1), &night, day(10)));

        let end = attribution_window_end(&tz, day(10), &morning);
        assert!(!belongs_to(&tz, end, &morning, day(10)));
        assert!(belongs_to(&tz, end - chrono::Duration::seconds(1), &morning, day(10)));
    }
}
