use anyhow::Context;
use chrono::NaiveDate;
use futures_util::StreamExt;
use sqlx::MySqlPool;

use crate::error::StoreError;
use crate::model::attendance::AttendanceDateRecord;
use crate::store::AttendanceStore;

/// MySQL-backed store. Each date is one row holding the record as a JSON
/// document plus the version column used for optimistic writes.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS attendance_records (
                record_date DATE NOT NULL PRIMARY KEY,
                version BIGINT UNSIGNED NOT NULL,
                document LONGTEXT NOT NULL,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn decode(date: NaiveDate, version: u64, document: &str) -> Result<AttendanceDateRecord, StoreError> {
        let mut record: AttendanceDateRecord = serde_json::from_str(document)
            .map_err(|source| StoreError::Corrupt { date, source })?;
        record.version = version;
        Ok(record)
    }
}

fn is_duplicate_key(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000"))
}

impl AttendanceStore for MySqlStore {
    async fn load(&self, date: NaiveDate) -> Result<Option<AttendanceDateRecord>, StoreError> {
        let row = sqlx::query_as::<_, (u64, String)>(
            r#"
            SELECT version, document
            FROM attendance_records
            WHERE record_date = ?
            "#,
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(version, document)| Self::decode(date, version, &document))
            .transpose()
    }

    async fn save(&self, record: &AttendanceDateRecord) -> Result<u64, StoreError> {
        let document = serde_json::to_string(record)
            .context("failed to serialize attendance record")?;
        let next_version = record.version + 1;

        if record.version == 0 {
            let inserted = sqlx::query(
                r#"
                INSERT INTO attendance_records (record_date, version, document)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(record.date)
            .bind(next_version)
            .bind(&document)
            .execute(&self.pool)
            .await;

            return match inserted {
                Ok(_) => Ok(next_version),
                // someone else created this date first
                Err(e) if is_duplicate_key(&e) => Err(StoreError::Conflict {
                    date: record.date,
                    expected: 0,
                }),
                Err(e) => {
                    tracing::error!(error = %e, date = %record.date, "Attendance insert failed");
                    Err(e.into())
                }
            };
        }

        let result = sqlx::query(
            r#"
            UPDATE attendance_records
            SET document = ?, version = ?
            WHERE record_date = ?
            AND version = ?
            "#,
        )
        .bind(&document)
        .bind(next_version)
        .bind(record.date)
        .bind(record.version)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, date = %record.date, "Attendance update failed");
            StoreError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict {
                date: record.date,
                expected: record.version,
            });
        }
        Ok(next_version)
    }

    async fn find_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceDateRecord>, StoreError> {
        let mut stream = sqlx::query_as::<_, (NaiveDate, u64, String)>(
            r#"
            SELECT record_date, version, document
            FROM attendance_records
            WHERE record_date BETWEEN ? AND ?
            ORDER BY record_date ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch(&self.pool);

        let mut records = Vec::new();
        while let Some(row) = stream.next().await {
            let (date, version, document) = row?;
            records.push(Self::decode(date, version, &document)?);
        }
        Ok(records)
    }
}
