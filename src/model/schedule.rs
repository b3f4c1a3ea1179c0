use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shift window (jadwal) assigned to an employee upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: u64,
    pub employee_id: u64,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub shift_label: String,
}

impl Schedule {
    /// Both ends inclusive.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.window_start <= instant && instant <= self.window_end
    }

    /// Overlap with the half-open interval `[start, end)`. A window ending
    /// exactly at `start` does not overlap.
    #[cfg(test)]
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.window_start < end && self.window_end > start
    }

    #[cfg(test)]
    pub fn starts_within(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start <= self.window_start && self.window_start < end
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct ScheduleSql {
    pub id: u64,
    pub employee_id: u64,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub shift_label: String,
}

impl From<ScheduleSql> for Schedule {
    fn from(row: ScheduleSql) -> Self {
        Schedule {
            id: row.id,
            employee_id: row.employee_id,
            window_start: row.window_start.and_utc(),
            window_end: row.window_end.and_utc(),
            shift_label: row.shift_label,
        }
    }
}
