//! Event-sourced employee attendance engine.
//!
//! Punches (`PUNCH_IN`, `BREAK_START`, `BREAK_END`, `PUNCH_OUT`) are validated
//! against a per-employee state machine, attributed to an attendance date in a
//! fixed reference timezone (night shifts that cross midnight stay on the date
//! they started), appended to that date's record and replayed to derive
//! durations, flags, performance scores and day-level statistics.
//!
//! The usual entry point is [`AttendanceService`], generic over an
//! [`AttendanceStore`] and the shift and leave directories.

pub mod config;
pub mod db;
pub mod directory;
pub mod engine;
pub mod error;
pub mod maintenance;
pub mod model;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod utils;

pub use config::{Config, EngineConfig};
pub use directory::{InMemoryDirectory, LeaveDirectory, ShiftDirectory};
pub use error::{AttendanceError, Result, StoreError, ValidationError};
pub use model::attendance::AttendanceStatus;
pub use model::employee::EmployeeId;
pub use model::punch_event::{EventType, PunchMetadata};
pub use service::AttendanceService;
pub use store::{AttendanceStore, InMemoryStore, MySqlStore};
pub use utils::clock::{Clock, FixedClock, SystemClock};
