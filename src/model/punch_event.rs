use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::model::employee::EmployeeId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    PunchIn,
    PunchOut,
    BreakStart,
    BreakEnd,
}

impl EventType {
    /// Confirmation shown to the employee once the event is recorded
    pub fn message(&self) -> &'static str {
        match self {
            EventType::PunchIn => "Successfully punched in",
            EventType::PunchOut => "Successfully punched out",
            EventType::BreakStart => "Break started",
            EventType::BreakEnd => "Break ended, work resumed",
        }
    }
}

/// Optional context captured with a punch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PunchMetadata {
    pub location: Option<String>,
    pub ip_address: Option<String>,
    pub device: Option<String>,
    #[serde(default)]
    pub manual: bool,
    pub approved_by: Option<EmployeeId>,
    pub notes: Option<String>,
}

/// A single punch. Immutable once appended to an employee's day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PunchEvent {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub metadata: PunchMetadata,
}

impl PunchEvent {
    pub fn new(event_type: EventType, timestamp: DateTime<Utc>, metadata: PunchMetadata) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            timestamp,
            metadata,
        }
    }
}
