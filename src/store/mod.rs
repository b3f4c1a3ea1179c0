//! Storage seams for the attendance engine.
//!
//! Components receive these as `Arc<dyn ...>` so the MySQL implementations
//! can be swapped for in-memory doubles in tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::attendance::clock::DayWindow;
use crate::model::attendance::{Attendance, AttendanceFilter, NewAttendance};
use crate::model::schedule::Schedule;

pub mod mysql;

#[cfg(test)]
pub mod memory;

/// MySQL SQLSTATE for integrity constraint violations (duplicate key).
pub const SQLSTATE_INTEGRITY: &str = "23000";
/// MySQL SQLSTATE for deadlocks / serialization failures.
pub const SQLSTATE_DEADLOCK: &str = "40001";

#[derive(Debug, Error)]
pub enum StoreError {
    /// `(employee_id, day)` already has a row.
    #[error("attendance already recorded for this employee and day")]
    Duplicate,

    /// Worth retrying: connection drops, pool timeouts, deadlocks.
    #[error("transient store failure: {0}")]
    Transient(String),

    #[error("store failure: {0}")]
    Fatal(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(SQLSTATE_INTEGRITY) => StoreError::Duplicate,
                Some(SQLSTATE_DEADLOCK) => StoreError::Transient(e.to_string()),
                _ => StoreError::Fatal(e.to_string()),
            },
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => StoreError::Transient(e.to_string()),
            _ => StoreError::Fatal(e.to_string()),
        }
    }
}

/// Read-only view of shift windows, owned by the scheduling subsystem.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Windows of one employee overlapping the given reference day
    /// (`window_start < day.end && window_end > day.start`).
    async fn find_covering_day(
        &self,
        employee_id: u64,
        day: &DayWindow,
    ) -> Result<Vec<Schedule>, StoreError>;

    /// Windows of every employee that start on the given reference day
    /// (`day.start <= window_start < day.end`).
    async fn find_all_starting_on_day(&self, day: &DayWindow)
    -> Result<Vec<Schedule>, StoreError>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find_by_employee_and_day(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> Result<Option<Attendance>, StoreError>;

    /// Atomically inserts the row unless `(employee_id, day)` is taken, in
    /// which case `StoreError::Duplicate` is returned and nothing is written.
    async fn insert_if_absent(&self, row: &NewAttendance) -> Result<Attendance, StoreError>;

    async fn find_by_id(&self, id: u64) -> Result<Option<Attendance>, StoreError>;

    /// Sets `verified = true`. `None` when the id does not exist.
    async fn mark_verified(&self, id: u64) -> Result<Option<Attendance>, StoreError>;

    /// Rows of one employee with `start <= day <= end`.
    async fn query_range(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Attendance>, StoreError>;

    /// Newest first (`day` desc, then `id` desc).
    async fn list(&self, filter: &AttendanceFilter) -> Result<Vec<Attendance>, StoreError>;
}
