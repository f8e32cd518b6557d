//! Reference-timezone arithmetic.
//!
//! All calendar dates and times-of-day in the engine are expressed in one fixed
//! reference offset, computed from absolute instants. The host clock's own
//! timezone never enters into it.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike, Utc,
};

/// India Standard Time, UTC+05:30.
pub const DEFAULT_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

/// Calendar and wall-clock components of an instant in the reference timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTimezone {
    offset: FixedOffset,
}

impl ReferenceTimezone {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// `None` when the offset is a day or more either way.
    pub fn from_offset_seconds(seconds: i32) -> Option<Self> {
        FixedOffset::east_opt(seconds).map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }

    pub fn parts(&self, instant: DateTime<Utc>) -> LocalParts {
        let local = self.localize(instant);
        LocalParts {
            year: local.year(),
            month: local.month(),
            day: local.day(),
            hour: local.hour(),
            minute: local.minute(),
            second: local.second(),
        }
    }

    pub fn calendar_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.localize(instant).date_naive()
    }

    pub fn time_of_day(&self, instant: DateTime<Utc>) -> NaiveTime {
        self.localize(instant).time()
    }

    /// The absolute instant at which the reference clock reads `time` on `date`.
    pub fn instant_at(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let shift = Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&(date.and_time(time) - shift))
    }

    /// Reference-timezone midnight of `date`.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.instant_at(date, NaiveTime::MIN)
    }
}

impl Default for ReferenceTimezone {
    fn default() -> Self {
        Self::new(FixedOffset::east_opt(DEFAULT_OFFSET_SECONDS).expect("IST offset is in range"))
    }
}

/// `YYYY-MM-DD`
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `"8h 5m"`; negative input renders as zero.
pub fn format_duration(seconds: i64) -> String {
    if seconds <= 0 {
        return "0h 0m".to_string();
    }
    format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
}

pub fn minutes_since_midnight(time: NaiveTime) -> f64 {
    f64::from(time.hour() * 60 + time.minute())
}

/// Formats a minutes-since-midnight value as `HH:MM`, rounding to the nearest minute.
pub fn minutes_to_time_string(minutes: f64) -> String {
    let total = minutes.max(0.0).round() as i64;
    format!("{:02}:{:02}", (total / 60) % 24, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn late_utc_evening_is_next_day_in_ist() {
        let tz = ReferenceTimezone::default();
        // 20:00 UTC = 01:30 IST next day
        let parts = tz.parts(utc(2024, 3, 10, 20, 0, 15));
        assert_eq!(
            parts,
            LocalParts {
                year: 2024,
                month: 3,
                day: 11,
                hour: 1,
                minute: 30,
                second: 15
            }
        );
    }

    #[test]
    fn instant_at_inverts_localize() {
        let tz = ReferenceTimezone::default();
        let date = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let time = NaiveTime::from_hms_opt(9, 0, 59).unwrap();

        let instant = tz.instant_at(date, time);
        assert_eq!(instant, utc(2024, 3, 11, 3, 30, 59));
        assert_eq!(tz.calendar_date(instant), date);
        assert_eq!(tz.time_of_day(instant), time);
        assert_eq!(tz.start_of_day(date), utc(2024, 3, 10, 18, 30, 0));
    }

    #[test]
    fn negative_offsets_work_too() {
        let tz = ReferenceTimezone::from_offset_seconds(-5 * 3600).unwrap();
        assert_eq!(
            tz.calendar_date(utc(2024, 1, 1, 3, 0, 0)),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
        assert!(ReferenceTimezone::from_offset_seconds(90_000).is_none());
    }

    #[test]
    fn formatting_helpers() {
        assert_eq!(format_duration(8 * 3600 + 5 * 60 + 59), "8h 5m");
        assert_eq!(format_duration(-10), "0h 0m");
        assert_eq!(minutes_to_time_string(9.0 * 60.0 + 14.6), "09:15");
        assert_eq!(minutes_to_time_string(0.0), "00:00");
        assert_eq!(date_key(NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()), "2024-02-05");
    }
}
