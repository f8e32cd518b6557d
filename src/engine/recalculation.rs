//! Event replay.
//!
//! Every derived field of an employee's day is recomputed from the full event
//! log; nothing is patched incrementally. The result depends only on the
//! arguments, so replaying twice with the same `now` gives the same output.

use chrono::{DateTime, NaiveDate, Utc};

use crate::config::EngineConfig;
use crate::engine::attribution;
use crate::model::attendance::{AttendanceStatus, CalculatedAttendance, Performance};
use crate::model::leave_request::LeaveInfo;
use crate::model::punch_event::{EventType, PunchEvent};
use crate::model::shift::ShiftDefinition;
use crate::utils::time_reference::format_duration;

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFields {
    pub calculated: CalculatedAttendance,
    pub performance: Performance,
}

#[derive(Default)]
struct Replay {
    work_ms: i64,
    break_ms: i64,
    work_start: Option<DateTime<Utc>>,
    break_start: Option<DateTime<Utc>>,
    arrival: Option<DateTime<Utc>>,
    departure: Option<DateTime<Utc>>,
    status: AttendanceStatus,
    work_sessions: u32,
    break_sessions: u32,
    longest_work_ms: i64,
    longest_break_ms: i64,
}

impl Replay {
    fn apply(&mut self, event: &PunchEvent) {
        let at = event.timestamp;
        match event.event_type {
            EventType::PunchIn => {
                self.arrival.get_or_insert(at);
                self.open_work(at);
            }
            EventType::BreakStart => {
                self.close_work(at);
                self.break_start = Some(at);
                self.break_sessions += 1;
                self.status = AttendanceStatus::OnBreak;
            }
            EventType::BreakEnd => {
                self.close_break(at);
                self.open_work(at);
            }
            EventType::PunchOut => {
                self.close_work(at);
                self.close_break(at);
                self.departure = Some(at);
                self.status = AttendanceStatus::Finished;
            }
        }
    }

    fn open_work(&mut self, at: DateTime<Utc>) {
        self.work_start = Some(at);
        self.work_sessions += 1;
        self.status = AttendanceStatus::Working;
    }

    fn close_work(&mut self, at: DateTime<Utc>) {
        if let Some(start) = self.work_start.take() {
            let ms = session_ms(start, at);
            self.work_ms += ms;
            self.longest_work_ms = self.longest_work_ms.max(ms);
        }
    }

    fn close_break(&mut self, at: DateTime<Utc>) {
        if let Some(start) = self.break_start.take() {
            let ms = session_ms(start, at);
            self.break_ms += ms;
            self.longest_break_ms = self.longest_break_ms.max(ms);
        }
    }
}

/// Non-positive sessions come from clock skew and count as nothing.
fn session_ms(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_milliseconds().max(0)
}

fn round_seconds(ms: i64) -> i64 {
    (ms + 500).div_euclid(1000)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Replays `events` for `attendance_date` as seen at `now`.
///
/// A session still open after the last event runs up to `now`, but never past
/// the last instant that attributes to `attendance_date`; once "now" has moved
/// on to a later attendance date the open session stops growing.
pub fn recalculate(
    events: &[PunchEvent],
    attendance_date: NaiveDate,
    shift: &ShiftDefinition,
    leave: &LeaveInfo,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> DerivedFields {
    let mut ordered: Vec<&PunchEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.timestamp);

    let mut replay = Replay::default();
    for event in ordered {
        replay.apply(event);
    }

    let live_until = now.min(attribution::attribution_window_end(
        &config.timezone,
        attendance_date,
        shift,
    ));
    if let Some(start) = replay.work_start {
        let ms = session_ms(start, live_until);
        replay.work_ms += ms;
        replay.longest_work_ms = replay.longest_work_ms.max(ms);
    }
    if let Some(start) = replay.break_start {
        let ms = session_ms(start, live_until);
        replay.break_ms += ms;
        replay.longest_break_ms = replay.longest_break_ms.max(ms);
    }

    let work_seconds = round_seconds(replay.work_ms);
    let break_seconds = round_seconds(replay.break_ms);
    let total_seconds = work_seconds + break_seconds;
    let work_hours = work_seconds as f64 / 3600.0;

    let late_minutes = replay
        .arrival
        .map(|arrival| late_minutes(arrival, attendance_date, shift, config))
        .unwrap_or(0);

    let calculated = CalculatedAttendance {
        arrival_time: replay.arrival,
        departure_time: replay.departure,
        work_duration_seconds: work_seconds,
        break_duration_seconds: break_seconds,
        total_duration_seconds: total_seconds,
        work_duration: format_duration(work_seconds),
        break_duration: format_duration(break_seconds),
        total_duration: format_duration(total_seconds),
        is_present: replay.arrival.is_some(),
        is_absent: replay.arrival.is_none(),
        is_late: late_minutes > 0,
        late_minutes,
        is_half_day: work_hours >= config.half_day_minimum_hours
            && work_hours < config.half_day_threshold_hours,
        is_full_day: work_hours >= config.full_day_minimum_hours,
        is_overtime: work_hours > config.max_work_hours,
        is_wfh: leave.is_wfh,
        is_paid_leave: leave.is_paid_leave,
        currently_working: replay.status == AttendanceStatus::Working,
        on_break: replay.status == AttendanceStatus::OnBreak,
        current_status: replay.status,
        total_work_sessions: replay.work_sessions,
        total_break_sessions: replay.break_sessions,
        longest_work_session: round_seconds(replay.longest_work_ms),
        longest_break_session: round_seconds(replay.longest_break_ms),
    };

    let performance = score(&calculated);
    DerivedFields {
        calculated,
        performance,
    }
}

/// Whole minutes late, rounded up, counted from the end of the grace period.
/// Zero when on time and always zero on a flexible shift.
pub fn late_minutes(
    arrival: DateTime<Utc>,
    attendance_date: NaiveDate,
    shift: &ShiftDefinition,
    config: &EngineConfig,
) -> i64 {
    if shift.is_flexible {
        return 0;
    }

    let start = attribution::shift_start(&config.timezone, attendance_date, shift);
    let seconds_late = (arrival - start).num_seconds();
    if seconds_late <= config.grace_period_seconds {
        return 0;
    }

    let beyond_grace = seconds_late - config.grace_period_seconds;
    (beyond_grace + 59) / 60
}

/// Punctuality, attendance and efficiency scores for a calculated day.
pub fn score(calculated: &CalculatedAttendance) -> Performance {
    let punctuality_score = if calculated.is_late {
        100_i64.saturating_sub(calculated.late_minutes.saturating_mul(2)).max(0) as u32
    } else {
        100
    };

    let attendance_score = if calculated.is_absent {
        0
    } else if calculated.is_half_day {
        50
    } else {
        100
    };

    Performance {
        punctuality_score,
        attendance_score,
        productivity_hours: round2(calculated.work_hours()),
        efficiency_rating: round2(efficiency_rating(
            calculated.work_hours(),
            calculated.break_hours(),
        )),
    }
}

fn efficiency_rating(work_hours: f64, break_hours: f64) -> f64 {
    if work_hours <= 0.0 {
        return 1.0;
    }

    let break_ratio = break_hours / work_hours;
    let mut rating: f64 = 5.0;

    if break_ratio > 0.15 {
        rating -= 0.5;
    }
    if break_ratio > 0.25 {
        rating -= 0.5;
    }
    if break_ratio > 0.35 {
        rating -= 1.0;
    }

    if work_hours < 6.0 {
        rating -= 0.5;
    }
    if work_hours < 4.0 {
        rating -= 1.0;
    }
    if work_hours < 2.0 {
        rating -= 1.5;
    }

    if work_hours >= 8.0 && break_ratio <= 0.15 {
        rating += 0.2;
    }

    rating.clamp(1.0, 5.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::punch_event::PunchMetadata;
    use crate::model::shift::StandardShift;
    use chrono::{Duration, NaiveTime};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn at(config: &EngineConfig, day: u32, h: u32, m: u32, s: u32) -> DateTime<Utc> {
        config
            .timezone
            .instant_at(d(day), NaiveTime::from_hms_opt(h, m, s).unwrap())
    }

    fn events(list: &[(EventType, DateTime<Utc>)]) -> Vec<PunchEvent> {
        list.iter()
            .map(|(t, ts)| PunchEvent::new(*t, *ts, PunchMetadata::default()))
            .collect()
    }

    fn run(
        evs: &[PunchEvent],
        date: NaiveDate,
        shift: &ShiftDefinition,
        now: DateTime<Utc>,
    ) -> CalculatedAttendance {
        recalculate(evs, date, shift, &LeaveInfo::default(), now, &EngineConfig::default()).calculated
    }

    #[test]
    fn night_shift_round_trip_stays_on_the_punch_in_date() {
        let config = EngineConfig::default();
        let night = StandardShift::Night.definition();
        let evs = events(&[
            (EventType::PunchIn, at(&config, 10, 20, 0, 0)),
            (EventType::BreakStart, at(&config, 10, 23, 30, 0)),
            (EventType::BreakEnd, at(&config, 11, 0, 30, 0)),
            (EventType::PunchOut, at(&config, 11, 5, 0, 0)),
        ]);

        let calc = run(&evs, d(10), &night, at(&config, 11, 12, 0, 0));
        assert_eq!(calc.work_duration_seconds, 8 * 3600);
        assert_eq!(calc.break_duration_seconds, 3600);
        assert_eq!(calc.total_duration_seconds, 9 * 3600);
        assert_eq!(calc.current_status, AttendanceStatus::Finished);
        assert!(calc.is_full_day);
        assert!(!calc.is_late);
        assert_eq!(calc.total_work_sessions, 2);
        assert_eq!(calc.total_break_sessions, 1);
        assert_eq!(calc.longest_work_session, 4 * 3600 + 30 * 60);
        assert_eq!(calc.work_duration, "8h 0m");
    }

    #[test]
    fn grace_period_boundary() {
        let config = EngineConfig::default();
        let morning = StandardShift::Morning.definition();

        let on_time = run(
            &events(&[(EventType::PunchIn, at(&config, 4, 9, 0, 59))]),
            d(4),
            &morning,
            at(&config, 4, 10, 0, 0),
        );
        assert!(!on_time.is_late);
        assert_eq!(on_time.late_minutes, 0);

        let late = run(
            &events(&[(EventType::PunchIn, at(&config, 4, 9, 1, 0))]),
            d(4),
            &morning,
            at(&config, 4, 10, 0, 0),
        );
        assert!(late.is_late);
        assert_eq!(late.late_minutes, 1);
    }

    #[test]
    fn late_minutes_round_up_past_grace() {
        let config = EngineConfig::default();
        let morning = StandardShift::Morning.definition();

        assert_eq!(late_minutes(at(&config, 4, 9, 2, 0), d(4), &morning, &config), 2);
        assert_eq!(late_minutes(at(&config, 4, 9, 30, 0), d(4), &morning, &config), 30);
        assert_eq!(late_minutes(at(&config, 4, 8, 0, 0), d(4), &morning, &config), 0);
    }

    #[test]
    fn flexible_shift_is_never_late() {
        let config = EngineConfig::default();
        let flexible = StandardShift::Morning.definition().flexible();
        let calc = run(
            &events(&[(EventType::PunchIn, at(&config, 4, 10, 0, 0))]),
            d(4),
            &flexible,
            at(&config, 4, 11, 0, 0),
        );
        assert!(!calc.is_late);
        assert_eq!(calc.late_minutes, 0);
    }

    #[test]
    fn night_arrival_after_midnight_is_late_against_last_evening() {
        let config = EngineConfig::default();
        let night = StandardShift::Night.definition();
        let calc = run(
            &events(&[(EventType::PunchIn, at(&config, 11, 0, 30, 0))]),
            d(10),
            &night,
            at(&config, 11, 1, 0, 0),
        );
        assert!(calc.is_late);
        assert_eq!(calc.late_minutes, 270);
    }

    #[test]
    fn open_session_grows_with_now_inside_the_attendance_date() {
        let config = EngineConfig::default();
        let night = StandardShift::Night.definition();
        let evs = events(&[(EventType::PunchIn, at(&config, 10, 20, 0, 0))]);

        let calc = run(&evs, d(10), &night, at(&config, 11, 2, 0, 0));
        assert_eq!(calc.work_duration_seconds, 6 * 3600);
        assert!(calc.currently_working);

        // the session is frozen at the window end once now leaves the date
        let later = run(&evs, d(10), &night, at(&config, 11, 9, 0, 0));
        assert_eq!(later.work_duration_seconds, 9 * 3600);
    }

    #[test]
    fn recalculation_is_idempotent() {
        let config = EngineConfig::default();
        let morning = StandardShift::Morning.definition();
        let evs = events(&[
            (EventType::PunchIn, at(&config, 4, 9, 12, 0)),
            (EventType::BreakStart, at(&config, 4, 13, 0, 0)),
        ]);
        let now = at(&config, 4, 13, 20, 0);

        let first = recalculate(&evs, d(4), &morning, &LeaveInfo::default(), now, &config);
        let second = recalculate(&evs, d(4), &morning, &LeaveInfo::default(), now, &config);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first.calculated).unwrap(),
            serde_json::to_string(&second.calculated).unwrap()
        );
    }

    #[test]
    fn totals_never_decrease_as_now_advances() {
        let config = EngineConfig::default();
        for shift in [StandardShift::Morning.definition(), StandardShift::Night.definition()] {
            let start = at(&config, 4, shift.start.format("%H").to_string().parse().unwrap(), 0, 0);
            let evs = events(&[
                (EventType::PunchIn, start),
                (EventType::BreakStart, start + Duration::hours(3)),
            ]);

            let mut previous = (0, 0);
            for step in 0..(48 * 4) {
                let now = start + Duration::minutes(15 * step);
                let calc = run(&evs, d(4), &shift, now);
                let current = (calc.work_duration_seconds, calc.break_duration_seconds);
                assert!(current.0 >= previous.0 && current.1 >= previous.1, "{} at step {step}", shift.name);
                previous = current;
            }
        }
    }

    #[test]
    fn skewed_sessions_are_discarded() {
        let config = EngineConfig::default();
        let morning = StandardShift::Morning.definition();
        let evs = events(&[
            (EventType::PunchIn, at(&config, 4, 9, 0, 0)),
            (EventType::PunchOut, at(&config, 4, 9, 0, 0)),
        ]);
        let calc = run(&evs, d(4), &morning, at(&config, 4, 18, 0, 0));
        assert_eq!(calc.work_duration_seconds, 0);
        assert!(calc.is_present);
    }

    #[test]
    fn day_flags_follow_work_hours() {
        let config = EngineConfig::default();
        let morning = StandardShift::Morning.definition();
        let day = |hours: i64| {
            let start = at(&config, 4, 9, 0, 0);
            run(
                &events(&[
                    (EventType::PunchIn, start),
                    (EventType::PunchOut, start + Duration::hours(hours)),
                ]),
                d(4),
                &morning,
                start + Duration::hours(20),
            )
        };

        let short = day(3);
        assert!(!short.is_half_day && !short.is_full_day);
        let half = day(5);
        assert!(half.is_half_day && !half.is_full_day);
        let full = day(8);
        assert!(!full.is_half_day && full.is_full_day && !full.is_overtime);
        let long = day(13);
        assert!(long.is_full_day && long.is_overtime);

        let absent = run(&[], d(4), &morning, at(&config, 4, 18, 0, 0));
        assert!(absent.is_absent && !absent.is_present);
    }

    #[test]
    fn leave_snapshot_is_copied() {
        let config = EngineConfig::default();
        let leave = LeaveInfo {
            is_wfh: true,
            is_paid_leave: true,
            ..LeaveInfo::default()
        };
        let derived = recalculate(
            &[],
            d(4),
            &ShiftDefinition::default(),
            &leave,
            at(&config, 4, 12, 0, 0),
            &config,
        );
        assert!(derived.calculated.is_wfh);
        assert!(derived.calculated.is_paid_leave);
    }

    #[test]
    fn performance_scores() {
        let mut calc = CalculatedAttendance {
            is_absent: false,
            is_present: true,
            is_late: true,
            late_minutes: 10,
            work_duration_seconds: 8 * 3600,
            break_duration_seconds: 3600,
            is_full_day: true,
            ..CalculatedAttendance::default()
        };
        let perf = score(&calc);
        assert_eq!(perf.punctuality_score, 80);
        assert_eq!(perf.attendance_score, 100);
        assert_eq!(perf.productivity_hours, 8.0);
        // 12.5% break ratio with a full day earns the bonus, capped at 5
        assert_eq!(perf.efficiency_rating, 5.0);

        calc.late_minutes = 75;
        calc.is_half_day = true;
        calc.is_full_day = false;
        calc.work_duration_seconds = 5 * 3600;
        calc.break_duration_seconds = 2 * 3600;
        let perf = score(&calc);
        assert_eq!(perf.punctuality_score, 0);
        assert_eq!(perf.attendance_score, 50);
        // ratio 0.4: -0.5 -0.5 -1, under 6h: -0.5
        assert_eq!(perf.efficiency_rating, 2.5);

        let absent = score(&CalculatedAttendance::default());
        assert_eq!(absent.attendance_score, 0);
        assert_eq!(absent.efficiency_rating, 1.0);
    }
}
