use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;

use crate::error::ConfigError;
use crate::utils::time_reference::{DEFAULT_OFFSET_SECONDS, ReferenceTimezone};

/// Upper bound for every time window in [`EngineConfig`], 100 years.
const MAX_WINDOW_HOURS: i64 = 24 * 365 * 100;

/// Attendance rules. Passed explicitly into every calculation so results are a
/// pure function of their inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub timezone: ReferenceTimezone,

    /// Arrival up to this many seconds after shift start is on time.
    pub grace_period_seconds: i64,
    pub half_day_minimum_hours: f64,
    /// Exclusive upper bound of the half-day band.
    pub half_day_threshold_hours: f64,
    pub full_day_minimum_hours: f64,
    pub max_work_hours: f64,

    pub early_punch_in_window_minutes: i64,
    pub duplicate_window_seconds: i64,
    pub max_past_hours: i64,
    pub max_future_minutes: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: ReferenceTimezone::default(),
            grace_period_seconds: 59,
            half_day_minimum_hours: 4.0,
            half_day_threshold_hours: 8.0,
            full_day_minimum_hours: 8.0,
            max_work_hours: 12.0,
            early_punch_in_window_minutes: 180,
            duplicate_window_seconds: 60,
            max_past_hours: 24,
            max_future_minutes: 5,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        let defaults = Self::default();

        let offset_minutes: i32 =
            env_or("ATTENDANCE_UTC_OFFSET_MINUTES", DEFAULT_OFFSET_SECONDS / 60)?;
        let timezone = ReferenceTimezone::from_offset_seconds(offset_minutes * 60).ok_or(
            ConfigError::Invalid {
                key: "ATTENDANCE_UTC_OFFSET_MINUTES",
                value: offset_minutes.to_string(),
            },
        )?;

        let config = Self {
            timezone,
            grace_period_seconds: env_or(
                "ATTENDANCE_GRACE_PERIOD_SECONDS",
                defaults.grace_period_seconds,
            )?,
            half_day_minimum_hours: env_or(
                "ATTENDANCE_HALF_DAY_MIN_HOURS",
                defaults.half_day_minimum_hours,
            )?,
            half_day_threshold_hours: env_or(
                "ATTENDANCE_HALF_DAY_THRESHOLD_HOURS",
                defaults.half_day_threshold_hours,
            )?,
            full_day_minimum_hours: env_or(
                "ATTENDANCE_FULL_DAY_MIN_HOURS",
                defaults.full_day_minimum_hours,
            )?,
            max_work_hours: env_or("ATTENDANCE_MAX_WORK_HOURS", defaults.max_work_hours)?,
            early_punch_in_window_minutes: env_or(
                "ATTENDANCE_EARLY_PUNCH_IN_MINUTES",
                defaults.early_punch_in_window_minutes,
            )?,
            duplicate_window_seconds: env_or(
                "ATTENDANCE_DUPLICATE_WINDOW_SECONDS",
                defaults.duplicate_window_seconds,
            )?,
            max_past_hours: env_or("ATTENDANCE_MAX_PAST_HOURS", defaults.max_past_hours)?,
            max_future_minutes: env_or(
                "ATTENDANCE_MAX_FUTURE_MINUTES",
                defaults.max_future_minutes,
            )?,
        };
        config.check()?;
        Ok(config)
    }

    /// Rejects values the rules cannot work with, including windows too wide
    /// to add to a timestamp.
    pub fn check(&self) -> Result<(), ConfigError> {
        let windows = [
            (
                "ATTENDANCE_GRACE_PERIOD_SECONDS",
                self.grace_period_seconds,
                MAX_WINDOW_HOURS * 3600,
            ),
            (
                "ATTENDANCE_EARLY_PUNCH_IN_MINUTES",
                self.early_punch_in_window_minutes,
                MAX_WINDOW_HOURS * 60,
            ),
            (
                "ATTENDANCE_DUPLICATE_WINDOW_SECONDS",
                self.duplicate_window_seconds,
                MAX_WINDOW_HOURS * 3600,
            ),
            ("ATTENDANCE_MAX_PAST_HOURS", self.max_past_hours, MAX_WINDOW_HOURS),
            (
                "ATTENDANCE_MAX_FUTURE_MINUTES",
                self.max_future_minutes,
                MAX_WINDOW_HOURS * 60,
            ),
        ];
        for (key, value, max) in windows {
            if !(0..=max).contains(&value) {
                return Err(ConfigError::Invalid {
                    key,
                    value: value.to_string(),
                });
            }
        }

        if self.half_day_minimum_hours > self.half_day_threshold_hours {
            return Err(ConfigError::Invalid {
                key: "ATTENDANCE_HALF_DAY_MIN_HOURS",
                value: self.half_day_minimum_hours.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Only needed when backing the engine with MySQL.
    pub database_url: Option<String>,
    pub log_dir: String,

    // Shift resolution cache
    pub shift_cache_ttl: Duration,
    pub shift_cache_capacity: u64,

    pub engine: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            log_dir: "logs".to_string(),
            shift_cache_ttl: Duration::from_secs(300),
            shift_cache_capacity: 10_000,
            engine: EngineConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok(),
            log_dir: env::var("ATTENDANCE_LOG_DIR").unwrap_or(defaults.log_dir),
            shift_cache_ttl: Duration::from_secs(env_or(
                "ATTENDANCE_SHIFT_CACHE_TTL_SECS",
                defaults.shift_cache_ttl.as_secs(),
            )?),
            shift_cache_capacity: env_or(
                "ATTENDANCE_SHIFT_CACHE_CAPACITY",
                defaults.shift_cache_capacity,
            )?,
            engine: EngineConfig::from_env()?,
        })
    }

    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_rules() {
        let config = EngineConfig::default();
        assert_eq!(config.grace_period_seconds, 59);
        assert_eq!(config.early_punch_in_window_minutes, 180);
        assert_eq!(config.timezone.offset().local_minus_utc(), 19_800);
        assert!(config.check().is_ok());
    }

    #[test]
    fn env_or_falls_back_and_rejects_garbage() {
        assert_eq!(env_or("ATTENDANCE_TEST_UNSET_KEY", 7_i64).unwrap(), 7);

        // SAFETY: the key is unique to this test.
        unsafe { env::set_var("ATTENDANCE_TEST_BAD_KEY", "seven") };
        let err = env_or("ATTENDANCE_TEST_BAD_KEY", 7_i64).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "ATTENDANCE_TEST_BAD_KEY", .. }));
    }

    #[test]
    fn out_of_range_windows_are_rejected() {
        let huge = EngineConfig {
            max_past_hours: 1_000_000_000_000,
            ..EngineConfig::default()
        };
        assert!(matches!(
            huge.check(),
            Err(ConfigError::Invalid { key: "ATTENDANCE_MAX_PAST_HOURS", .. })
        ));

        let negative = EngineConfig {
            early_punch_in_window_minutes: -1,
            ..EngineConfig::default()
        };
        assert!(matches!(
            negative.check(),
            Err(ConfigError::Invalid { key: "ATTENDANCE_EARLY_PUNCH_IN_MINUTES", .. })
        ));

        let future = EngineConfig {
            max_future_minutes: i64::MAX,
            ..EngineConfig::default()
        };
        assert!(future.check().is_err());

        let widest = EngineConfig {
            max_past_hours: MAX_WINDOW_HOURS,
            ..EngineConfig::default()
        };
        assert!(widest.check().is_ok());
    }

    #[test]
    fn inverted_half_day_band_is_rejected() {
        let config = EngineConfig {
            half_day_minimum_hours: 9.0,
            ..EngineConfig::default()
        };
        assert!(config.check().is_err());
    }
}
