use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;

use super::{AttendanceStore, ScheduleStore, StoreError};
use crate::attendance::clock::DayWindow;
use crate::model::attendance::{Attendance, AttendanceFilter, AttendanceSql, NewAttendance};
use crate::model::schedule::{Schedule, ScheduleSql};

const ATTENDANCE_COLUMNS: &str =
    "id, employee_id, day, status, verified, recorded_at, schedule_id";

const SCHEDULE_COLUMNS: &str = "id, employee_id, window_start, window_end, shift_label";

fn to_attendance(rows: Vec<AttendanceSql>) -> Result<Vec<Attendance>, StoreError> {
    rows.into_iter().map(decode_row).collect()
}

fn decode_row(row: AttendanceSql) -> Result<Attendance, StoreError> {
    let id = row.id;
    Attendance::try_from(row)
        .map_err(|e| StoreError::Fatal(format!("attendance {id} has an unknown status: {e}")))
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(&'static str),
    Date(NaiveDate),
}

pub struct MySqlScheduleStore {
    pool: MySqlPool,
}

impl MySqlScheduleStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleStore for MySqlScheduleStore {
    async fn find_covering_day(
        &self,
        employee_id: u64,
        day: &DayWindow,
    ) -> Result<Vec<Schedule>, StoreError> {
        let sql = format!(
            r#"
            SELECT {SCHEDULE_COLUMNS}
            FROM schedules
            WHERE employee_id = ?
            AND window_start < ?
            AND window_end > ?
            ORDER BY window_start ASC
            "#
        );

        let rows = sqlx::query_as::<_, ScheduleSql>(&sql)
            .bind(employee_id)
            .bind(day.end.naive_utc())
            .bind(day.start.naive_utc())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Schedule::from).collect())
    }

    async fn find_all_starting_on_day(
        &self,
        day: &DayWindow,
    ) -> Result<Vec<Schedule>, StoreError> {
        let sql = format!(
            r#"
            SELECT {SCHEDULE_COLUMNS}
            FROM schedules
            WHERE window_start >= ?
            AND window_start < ?
            ORDER BY employee_id ASC, window_start ASC
            "#
        );

        let rows = sqlx::query_as::<_, ScheduleSql>(&sql)
            .bind(day.start.naive_utc())
            .bind(day.end.naive_utc())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Schedule::from).collect())
    }
}

pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn find_by_employee_and_day(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> Result<Option<Attendance>, StoreError> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE employee_id = ? AND day = ?"
        );

        sqlx::query_as::<_, AttendanceSql>(&sql)
            .bind(employee_id)
            .bind(day)
            .fetch_optional(&self.pool)
            .await?
            .map(decode_row)
            .transpose()
    }

    async fn insert_if_absent(&self, row: &NewAttendance) -> Result<Attendance, StoreError> {
        // uq_attendance_employee_day rejects the loser of any race with 23000
        let result = sqlx::query(
            r#"
            INSERT INTO attendance
                (employee_id, day, status, verified, recorded_at, schedule_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(row.employee_id)
        .bind(row.day)
        .bind(<&'static str>::from(row.status))
        .bind(row.verified)
        .bind(row.recorded_at.naive_utc())
        .bind(row.schedule_id)
        .execute(&self.pool)
        .await?;

        Ok(row.clone().into_attendance(result.last_insert_id()))
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<Attendance>, StoreError> {
        let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE id = ?");

        sqlx::query_as::<_, AttendanceSql>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(decode_row)
            .transpose()
    }

    async fn mark_verified(&self, id: u64) -> Result<Option<Attendance>, StoreError> {
        // rows_affected is 0 for an already verified row too, so re-read instead
        sqlx::query("UPDATE attendance SET verified = TRUE WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.find_by_id(id).await
    }

    async fn query_range(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Attendance>, StoreError> {
        let sql = format!(
            r#"
            SELECT {ATTENDANCE_COLUMNS}
            FROM attendance
            WHERE employee_id = ?
            AND day BETWEEN ? AND ?
            ORDER BY day ASC
            "#
        );

        let rows = sqlx::query_as::<_, AttendanceSql>(&sql)
            .bind(employee_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        to_attendance(rows)
    }

    async fn list(&self, filter: &AttendanceFilter) -> Result<Vec<Attendance>, StoreError> {
        // -------------------------
        // WHERE clause
        // -------------------------
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(status) = filter.status {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Str(status.into()));
        }

        if !filter.statuses.is_empty() {
            let placeholders = vec!["?"; filter.statuses.len()].join(", ");
            where_sql.push_str(&format!(" AND status IN ({placeholders})"));
            args.extend(filter.statuses.iter().map(|s| FilterValue::Str((*s).into())));
        }

        if let Some(employee_id) = filter.employee_id {
            where_sql.push_str(" AND employee_id = ?");
            args.push(FilterValue::U64(employee_id));
        }

        if let Some(start) = filter.start {
            where_sql.push_str(" AND day >= ?");
            args.push(FilterValue::Date(start));
        }

        if let Some(end) = filter.end {
            where_sql.push_str(" AND day <= ?");
            args.push(FilterValue::Date(end));
        }

        let mut sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance{where_sql} ORDER BY day DESC, id DESC"
        );
        if filter.limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut query = sqlx::query_as::<_, AttendanceSql>(&sql);
        for arg in args {
            query = match arg {
                FilterValue::U64(v) => query.bind(v),
                FilterValue::Str(s) => query.bind(s),
                FilterValue::Date(d) => query.bind(d),
            };
        }
        if let Some(limit) = filter.limit {
            query = query.bind(limit);
        }

        let rows = query.fetch_all(&self.pool).await?;
        to_attendance(rows)
    }
}
