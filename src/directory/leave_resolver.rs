use chrono::NaiveDate;
use tracing::warn;

use crate::directory::LeaveDirectory;
use crate::model::employee::EmployeeId;
use crate::model::leave_request::{LeaveInfo, SpecialDayInfo};
use crate::utils::time_reference::date_key;

/// Leave and holiday lookups that degrade to "no leave" / "working day".
pub struct LeaveResolver<L> {
    directory: L,
}

impl<L: LeaveDirectory> LeaveResolver<L> {
    pub fn new(directory: L) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &L {
        &self.directory
    }

    pub async fn leave_info(&self, employee_id: &EmployeeId, date: NaiveDate) -> LeaveInfo {
        let mut info = match self.directory.leave_info(employee_id, date).await {
            Ok(info) => info.unwrap_or_default(),
            Err(e) => {
                warn!(
                    error = %e,
                    employee_id = %employee_id,
                    date = %date_key(date),
                    "Leave lookup failed, assuming no leave"
                );
                return LeaveInfo::default();
            }
        };

        if !info.is_holiday {
            if let Some(name) = self.holiday_name(date).await {
                info.is_holiday = true;
                info.holiday_name = Some(name);
            }
        }
        info
    }

    pub async fn special_day(&self, date: NaiveDate) -> SpecialDayInfo {
        SpecialDayInfo::for_date(date, self.holiday_name(date).await)
    }

    async fn holiday_name(&self, date: NaiveDate) -> Option<String> {
        match self.directory.holiday(date).await {
            Ok(name) => name,
            Err(e) => {
                warn!(error = %e, date = %date_key(date), "Holiday lookup failed, assuming working day");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;

    fn date() -> NaiveDate {
        // Monday
        NaiveDate::from_ymd_opt(2024, 6, 17).unwrap()
    }

    #[tokio::test]
    async fn holiday_is_folded_into_leave_info() {
        let directory = InMemoryDirectory::new();
        directory.add_holiday(date(), "Founders Day");
        directory.set_leave(
            "E1".into(),
            date(),
            LeaveInfo {
                is_wfh: true,
                leave_type: Some("workFromHome".to_string()),
                ..LeaveInfo::default()
            },
        );
        let resolver = LeaveResolver::new(directory);

        let info = resolver.leave_info(&"E1".into(), date()).await;
        assert!(info.is_wfh);
        assert!(info.is_holiday);
        assert_eq!(info.holiday_name.as_deref(), Some("Founders Day"));

        let special = resolver.special_day(date()).await;
        assert!(special.is_holiday);
        assert!(!special.is_working_day);
    }

    #[tokio::test]
    async fn unavailable_directory_means_no_leave() {
        let directory = InMemoryDirectory::new();
        directory.add_holiday(date(), "Founders Day");
        directory.set_unavailable(true);
        let resolver = LeaveResolver::new(directory);

        assert_eq!(resolver.leave_info(&"E1".into(), date()).await, LeaveInfo::default());
        assert_eq!(resolver.special_day(date()).await, SpecialDayInfo::default());
    }
}
