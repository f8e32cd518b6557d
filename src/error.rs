//! Error types for the attendance engine.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

use crate::model::attendance::AttendanceStatus;
use crate::model::punch_event::EventType;

/// A punch rejected before anything was written.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("cannot record {event} while {actual}; expected {}", join_states(.expected))]
    StateViolation {
        event: EventType,
        expected: &'static [AttendanceStatus],
        actual: AttendanceStatus,
    },

    #[error(
        "duplicate {event} within {window_seconds} seconds of the previous one; please wait before trying again"
    )]
    DuplicateEvent {
        event: EventType,
        window_seconds: i64,
    },

    #[error("event time {timestamp} is outside the accepted window {earliest} .. {latest}")]
    TimestampOutOfRange {
        timestamp: DateTime<Utc>,
        earliest: DateTime<Utc>,
        latest: DateTime<Utc>,
    },

    #[error("event time {attempted} is earlier than the last recorded event at {last}")]
    EventOutOfOrder {
        attempted: DateTime<Utc>,
        last: DateTime<Utc>,
    },

    #[error(
        "cannot punch in earlier than {window_minutes} minutes before shift start ({}); earliest allowed is {}",
        .shift_start.format("%H:%M"),
        .earliest_allowed.format("%Y-%m-%d %H:%M")
    )]
    EarlyPunchInRejected {
        earliest_allowed: DateTime<FixedOffset>,
        shift_start: NaiveTime,
        window_minutes: i64,
    },
}

fn join_states(states: &[AttendanceStatus]) -> String {
    states
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Failures at the persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Someone else wrote the record first; nothing was persisted.
    #[error("attendance record for {date} was modified concurrently (expected version {expected})")]
    Conflict { date: NaiveDate, expected: u64 },

    #[error("attendance record for {date} is corrupt: {source}")]
    Corrupt {
        date: NaiveDate,
        #[source]
        source: serde_json::Error,
    },

    #[error("store unavailable: {0}")]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.into())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

pub type Result<T> = std::result::Result<T, AttendanceError>;
