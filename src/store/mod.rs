//! Persistence boundary: one document per attendance date.
//!
//! Writes are optimistic. A record carries the `version` it was loaded at and
//! `save` only succeeds if the stored version still matches, so two writers
//! racing on the same date cannot silently drop each other's events.

pub mod memory;
pub mod mysql;

use chrono::NaiveDate;

use crate::error::StoreError;
use crate::model::attendance::AttendanceDateRecord;

pub use memory::InMemoryStore;
pub use mysql::MySqlStore;

#[allow(async_fn_in_trait)]
pub trait AttendanceStore: Send + Sync {
    async fn load(&self, date: NaiveDate) -> Result<Option<AttendanceDateRecord>, StoreError>;

    /// Inserts (version 0) or replaces the record, returning the new version.
    /// Fails with [`StoreError::Conflict`] if the stored version moved on.
    async fn save(&self, record: &AttendanceDateRecord) -> Result<u64, StoreError>;

    /// Records with `start <= date <= end`, ordered by date.
    async fn find_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceDateRecord>, StoreError>;
}
