use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};
use utoipa::ToSchema;

/// Attendance status. A row is created directly into one of these and is
/// never moved to another afterwards.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
    IntoStaticStr, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    /// checked in within the grace period
    Hadir,
    /// checked in after the grace period, still inside the shift window
    Terlambat,
    /// unexcused absence, only written by the daily sweep
    Alfa,
    /// excused leave, assigned externally
    Izin,
    /// sick leave, assigned externally
    Sakit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 1000,
    "day": "2026-01-05",
    "status": "TERLAMBAT",
    "verified": false,
    "recorded_at": "2026-01-05T01:20:00Z",
    "schedule_id": 12
}))]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1000)]
    pub employee_id: u64,

    /// calendar day in the reference timezone
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub day: NaiveDate,

    pub status: AttendanceStatus,

    #[schema(example = false)]
    pub verified: bool,

    #[schema(example = "2026-01-05T01:20:00Z", value_type = String, format = "date-time")]
    pub recorded_at: DateTime<Utc>,

    /// shift window matched by the check-in, empty for sweep rows
    #[schema(example = 12, nullable = true)]
    pub schedule_id: Option<u64>,
}

/// A row about to be written through `insert_if_absent`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendance {
    pub employee_id: u64,
    pub day: NaiveDate,
    pub status: AttendanceStatus,
    pub verified: bool,
    pub recorded_at: DateTime<Utc>,
    pub schedule_id: Option<u64>,
}

impl NewAttendance {
    pub fn into_attendance(self, id: u64) -> Attendance {
        Attendance {
            id,
            employee_id: self.employee_id,
            day: self.day,
            status: self.status,
            verified: self.verified,
            recorded_at: self.recorded_at,
            schedule_id: self.schedule_id,
        }
    }
}

/// Raw `attendance` row as MySQL returns it.
#[derive(Debug, sqlx::FromRow)]
pub struct AttendanceSql {
    pub id: u64,
    pub employee_id: u64,
    pub day: NaiveDate,
    pub status: String,
    pub verified: bool,
    pub recorded_at: NaiveDateTime,
    pub schedule_id: Option<u64>,
}

impl TryFrom<AttendanceSql> for Attendance {
    type Error = strum::ParseError;

    fn try_from(row: AttendanceSql) -> Result<Self, Self::Error> {
        Ok(Attendance {
            id: row.id,
            employee_id: row.employee_id,
            day: row.day,
            status: row.status.parse()?,
            verified: row.verified,
            recorded_at: row.recorded_at.and_utc(),
            schedule_id: row.schedule_id,
        })
    }
}

/// Criteria for listing attendance rows. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceFilter {
    pub status: Option<AttendanceStatus>,
    pub statuses: Vec<AttendanceStatus>,
    pub employee_id: Option<u64>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub limit: Option<u32>,
}

impl AttendanceFilter {
    /// In-process mirror of the SQL WHERE clause, used by the test store.
    #[cfg(test)]
    pub fn matches(&self, row: &Attendance) -> bool {
        self.status.is_none_or(|s| row.status == s)
            && (self.statuses.is_empty() || self.statuses.contains(&row.status))
            && self.employee_id.is_none_or(|id| row.employee_id == id)
            && self.start.is_none_or(|d| row.day >= d)
            && self.end.is_none_or(|d| row.day <= d)
    }
}
