//! Attendance service: the write path for punches and the live read paths.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, error, info, instrument};

use crate::config::{Config, EngineConfig};
use crate::directory::{LeaveDirectory, LeaveResolver, ShiftDirectory, ShiftResolver};
use crate::engine::{attribution, summary, validator};
use crate::error::{AttendanceError, Result, StoreError};
use crate::maintenance::{self, RecalculationReport};
use crate::model::attendance::{AttendanceDateRecord, EmployeeDayAttendance};
use crate::model::employee::EmployeeId;
use crate::model::punch_event::{EventType, PunchEvent, PunchMetadata};
use crate::model::shift::ShiftDefinition;
use crate::model::report::{
    DailyReport, DailySnapshot, DayAttendance, EmployeeAttendanceReport, PunchOutcome,
    WeeklySummary,
};
use crate::store::AttendanceStore;
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::time_reference::date_key;

pub struct AttendanceService<S, D, L> {
    store: S,
    shifts: ShiftResolver<D>,
    leave: LeaveResolver<L>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl<S, D, L> AttendanceService<S, D, L>
where
    S: AttendanceStore,
    D: ShiftDirectory,
    L: LeaveDirectory,
{
    pub fn new(store: S, shift_directory: D, leave_directory: L, config: &Config) -> Self {
        Self {
            store,
            shifts: ShiftResolver::new(
                shift_directory,
                config.shift_cache_ttl,
                config.shift_cache_capacity,
            ),
            leave: LeaveResolver::new(leave_directory),
            clock: Arc::new(SystemClock),
            config: config.engine.clone(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn shift_resolver(&self) -> &ShiftResolver<D> {
        &self.shifts
    }

    /// Records a punch happening now.
    pub async fn record_punch_event(
        &self,
        employee_id: &EmployeeId,
        event_type: EventType,
        metadata: PunchMetadata,
    ) -> Result<PunchOutcome> {
        let now = self.clock.now();
        self.record(employee_id, event_type, now, now, metadata).await
    }

    /// Records a punch on someone's behalf with an explicit time. The entry is
    /// flagged manual and still has to pass every validation rule.
    pub async fn record_manual_event(
        &self,
        employee_id: &EmployeeId,
        event_type: EventType,
        timestamp: DateTime<Utc>,
        approved_by: EmployeeId,
        mut metadata: PunchMetadata,
    ) -> Result<PunchOutcome> {
        metadata.manual = true;
        metadata.approved_by = Some(approved_by);
        let now = self.clock.now();
        self.record(employee_id, event_type, timestamp, now, metadata).await
    }

    #[instrument(
        skip(self, metadata),
        fields(employee_id = %employee_id, event = %event_type)
    )]
    async fn record(
        &self,
        employee_id: &EmployeeId,
        event_type: EventType,
        timestamp: DateTime<Utc>,
        now: DateTime<Utc>,
        metadata: PunchMetadata,
    ) -> Result<PunchOutcome> {
        let (attendance_date, shift) = self.attribute(employee_id, timestamp).await;

        let mut record = match self.store.load(attendance_date).await? {
            Some(record) => record,
            None => self.new_record(attendance_date).await,
        };

        let existing = record
            .employees
            .iter()
            .position(|e| &e.employee_id == employee_id);
        let employee = match existing {
            Some(index) => &mut record.employees[index],
            None => {
                let leave = self.leave.leave_info(employee_id, attendance_date).await;
                record.upsert_employee(EmployeeDayAttendance::new(employee_id.clone(), shift, leave))
            }
        };

        if let Err(e) = validator::validate_punch(
            employee,
            event_type,
            timestamp,
            attendance_date,
            now,
            &self.config,
        ) {
            debug!(error = %e, date = %date_key(attendance_date), "Punch rejected");
            return Err(e.into());
        }

        let event = PunchEvent::new(event_type, timestamp, metadata);
        employee.events.push(event.clone());
        employee.refresh(attendance_date, now, &self.config);
        let employee = employee.clone();

        record.refresh_statistics(&self.config);
        record.version = self.store.save(&record).await.map_err(|e| {
            error!(error = %e, date = %date_key(attendance_date), "Failed to persist punch");
            e
        })?;

        info!(
            date = %date_key(attendance_date),
            status = %employee.calculated.current_status,
            "Punch recorded"
        );

        Ok(PunchOutcome {
            attendance_date,
            employee,
            event,
            message: event_type.message(),
        })
    }

    /// An employee's days in `[start, end]`, recomputed against now, plus a
    /// summary. Reads only.
    pub async fn get_employee_attendance(
        &self,
        employee_id: &EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<EmployeeAttendanceReport> {
        check_range(start, end)?;
        let now = self.clock.now();

        let days: Vec<DayAttendance> = self
            .store
            .find_range(start, end)
            .await?
            .into_iter()
            .filter_map(|record| {
                let mut employee = record.employee(employee_id)?.clone();
                employee.refresh(record.date, now, &self.config);
                Some(DayAttendance {
                    date: record.date,
                    calculated: employee.calculated,
                    events: employee.events,
                    shift: employee.assigned_shift,
                    leave: employee.leave_info,
                    performance: employee.performance,
                })
            })
            .collect();

        let summary = summary::period_summary(&days);
        Ok(EmployeeAttendanceReport {
            employee_id: employee_id.clone(),
            start_date: start,
            end_date: end,
            days,
            summary,
        })
    }

    /// Statistics and every employee for `date`, live as of now. Creates the
    /// date record if this is the first time it is asked for.
    pub async fn get_daily_report(&self, date: NaiveDate) -> Result<DailyReport> {
        let mut record = self.load_or_create(date).await?;
        record.refresh_all(self.clock.now(), &self.config);

        Ok(DailyReport {
            date: record.date,
            statistics: record.daily_statistics,
            special_day: record.special_day,
            employees: record.employees,
        })
    }

    /// Per-day statistics over `[start, end]` with period totals.
    pub async fn get_weekly_summary(&self, start: NaiveDate, end: NaiveDate) -> Result<WeeklySummary> {
        check_range(start, end)?;
        let now = self.clock.now();

        let daily: Vec<DailySnapshot> = self
            .store
            .find_range(start, end)
            .await?
            .into_iter()
            .map(|mut record| {
                record.refresh_all(now, &self.config);
                DailySnapshot {
                    date: record.date,
                    employee_count: record.employees.len() as u32,
                    statistics: record.daily_statistics,
                }
            })
            .collect();

        let totals = summary::period_totals(&daily);
        Ok(WeeklySummary {
            start_date: start,
            end_date: end,
            daily,
            totals,
        })
    }

    /// Recomputes and persists every stored record in `[start, end]`.
    pub async fn recalculate_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RecalculationReport> {
        maintenance::recalculate_range(&self.store, start, end, self.clock.now(), &self.config).await
    }

    /// Attendance date for a punch at `timestamp`, with the shift resolved for
    /// that date.
    ///
    /// The punch date's own shift is asked first. If it leaves the punch on
    /// its calendar date, last night's shift still claims it when that shift
    /// crosses midnight and has not ended yet, so a night override or a
    /// shift change the next day cannot strand an open night session.
    async fn attribute(
        &self,
        employee_id: &EmployeeId,
        timestamp: DateTime<Utc>,
    ) -> (NaiveDate, ShiftDefinition) {
        let timezone = &self.config.timezone;
        let punch_date = timezone.calendar_date(timestamp);
        let shift = self.shifts.resolve(employee_id, punch_date).await;

        let attributed = attribution::attribute_date(timezone, timestamp, &shift);
        if attributed != punch_date {
            return (attributed, self.shifts.resolve(employee_id, attributed).await);
        }

        if let Some(previous) = punch_date.pred_opt() {
            let last_night = self.shifts.resolve(employee_id, previous).await;
            if attribution::belongs_to(timezone, timestamp, &last_night, previous) {
                return (previous, last_night);
            }
        }
        (punch_date, shift)
    }

    async fn new_record(&self, date: NaiveDate) -> AttendanceDateRecord {
        AttendanceDateRecord::new(date, self.leave.special_day(date).await)
    }

    async fn load_or_create(&self, date: NaiveDate) -> Result<AttendanceDateRecord> {
        if let Some(record) = self.store.load(date).await? {
            return Ok(record);
        }

        let mut record = self.new_record(date).await;
        match self.store.save(&record).await {
            Ok(version) => {
                record.version = version;
                Ok(record)
            }
            // created concurrently; read the winner
            Err(StoreError::Conflict { .. }) => self
                .store
                .load(date)
                .await?
                .ok_or_else(|| StoreError::Conflict { date, expected: 0 }.into()),
            Err(e) => Err(e.into()),
        }
    }
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(AttendanceError::InvalidRange { start, end });
    }
    Ok(())
}
