use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Leave and holiday classification of one employee on one date, snapshotted
/// when the employee's day is first created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaveInfo {
    pub is_on_leave: bool,
    pub leave_type: Option<String>,
    pub is_wfh: bool,
    pub is_paid_leave: bool,
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
}

/// Holiday/weekend classification of a calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialDayInfo {
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
    pub is_weekend: bool,
    pub is_working_day: bool,
}

impl SpecialDayInfo {
    pub fn for_date(date: NaiveDate, holiday_name: Option<String>) -> Self {
        let is_weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        let is_holiday = holiday_name.is_some();

        Self {
            is_holiday,
            holiday_name,
            is_weekend,
            is_working_day: !is_holiday && !is_weekend,
        }
    }
}

impl Default for SpecialDayInfo {
    fn default() -> Self {
        Self {
            is_holiday: false,
            holiday_name: None,
            is_weekend: false,
            is_working_day: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekends_and_holidays_are_not_working_days() {
        // 2024-06-15 is a Saturday
        let saturday = SpecialDayInfo::for_date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(), None);
        assert!(saturday.is_weekend);
        assert!(!saturday.is_working_day);

        let holiday = SpecialDayInfo::for_date(
            NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
            Some("Independence Day".to_string()),
        );
        assert!(holiday.is_holiday);
        assert!(!holiday.is_weekend);
        assert!(!holiday.is_working_day);

        let monday = SpecialDayInfo::for_date(NaiveDate::from_ymd_opt(2024, 6, 17).unwrap(), None);
        assert!(monday.is_working_day);
    }
}
