use chrono::NaiveTime;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Shift used when nothing else resolves for an employee.
pub static DEFAULT_SHIFT: Lazy<ShiftDefinition> = Lazy::new(|| StandardShift::Morning.definition());

/// Effective shift for one employee on one date, in reference-timezone wall-clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftDefinition {
    pub name: String,
    #[serde(with = "wall_clock")]
    pub start: NaiveTime,
    #[serde(with = "wall_clock")]
    pub end: NaiveTime,
    pub duration_hours: f64,
    #[serde(default)]
    pub is_flexible: bool,
}

impl ShiftDefinition {
    pub fn new(
        name: impl Into<String>,
        start: NaiveTime,
        end: NaiveTime,
        duration_hours: f64,
        is_flexible: bool,
    ) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            duration_hours,
            is_flexible,
        }
        .normalized()
    }

    /// Builds a shift from directory notation ("HH:MM").
    pub fn from_wall_clock(
        name: impl Into<String>,
        start: &str,
        end: &str,
        duration_hours: f64,
        is_flexible: bool,
    ) -> Result<Self, chrono::ParseError> {
        let start = wall_clock::parse(start)?;
        let end = wall_clock::parse(end)?;
        Ok(Self::new(name, start, end, duration_hours, is_flexible))
    }

    /// A shift whose name says it is flexible is flexible, whatever the flag says.
    pub fn normalized(mut self) -> Self {
        if self.name.to_lowercase().contains("flex") {
            self.is_flexible = true;
        }
        self
    }

    pub fn flexible(mut self) -> Self {
        self.is_flexible = true;
        self
    }

    /// End time-of-day numerically earlier than start, e.g. 20:00 -> 05:00.
    pub fn crosses_midnight(&self) -> bool {
        self.end < self.start
    }
}

impl Default for ShiftDefinition {
    fn default() -> Self {
        DEFAULT_SHIFT.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum StandardShift {
    Morning,
    Evening,
    Night,
    Early,
}

impl StandardShift {
    pub fn definition(&self) -> ShiftDefinition {
        let (name, start, end) = match self {
            StandardShift::Morning => ("Day Shift (Morning Shift)", wall(9, 0), wall(18, 0)),
            StandardShift::Evening => ("Evening Shift", wall(13, 0), wall(22, 0)),
            StandardShift::Night => ("Night Shift", wall(20, 0), wall(5, 0)),
            StandardShift::Early => ("Early Morning Shift", wall(5, 30), wall(14, 30)),
        };
        ShiftDefinition::new(name, start, end, 9.0, false)
    }
}

fn wall(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("standard shift times are valid")
}

/// "HH:MM" on the wire; "HH:MM:SS" is accepted on input.
pub mod wall_clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(value: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(value, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}
