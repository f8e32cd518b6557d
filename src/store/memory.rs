use std::collections::BTreeMap;
use std::sync::RwLock;

use anyhow::anyhow;
use chrono::NaiveDate;

use crate::error::StoreError;
use crate::model::attendance::AttendanceDateRecord;
use crate::store::AttendanceStore;

/// In-memory store for tests and development
#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<BTreeMap<NaiveDate, AttendanceDateRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend(anyhow!("attendance store lock poisoned"))
}

impl AttendanceStore for InMemoryStore {
    async fn load(&self, date: NaiveDate) -> Result<Option<AttendanceDateRecord>, StoreError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.get(&date).cloned())
    }

    async fn save(&self, record: &AttendanceDateRecord) -> Result<u64, StoreError> {
        let mut records = self.records.write().map_err(|_| poisoned())?;

        let stored_version = records.get(&record.date).map(|r| r.version).unwrap_or(0);
        if stored_version != record.version {
            return Err(StoreError::Conflict {
                date: record.date,
                expected: record.version,
            });
        }

        let mut saved = record.clone();
        saved.version = stored_version + 1;
        records.insert(saved.date, saved);
        Ok(stored_version + 1)
    }

    async fn find_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceDateRecord>, StoreError> {
        if start > end {
            return Ok(Vec::new());
        }
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.range(start..=end).map(|(_, r)| r.clone()).collect())
    }
}
