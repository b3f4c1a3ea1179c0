//! In-memory store doubles for tests. `insert_if_absent` holds one mutex
//! across the check and the write, standing in for the MySQL unique key.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{AttendanceStore, ScheduleStore, StoreError};
use crate::attendance::clock::DayWindow;
use crate::model::attendance::{Attendance, AttendanceFilter, NewAttendance};
use crate::model::schedule::Schedule;

#[derive(Default)]
pub struct MemoryScheduleStore {
    schedules: Mutex<Vec<Schedule>>,
}

impl MemoryScheduleStore {
    pub fn with(schedules: Vec<Schedule>) -> Self {
        Self {
            schedules: Mutex::new(schedules),
        }
    }
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    async fn find_covering_day(
        &self,
        employee_id: u64,
        day: &DayWindow,
    ) -> Result<Vec<Schedule>, StoreError> {
        let schedules = self.schedules.lock().unwrap();
        Ok(schedules
            .iter()
            .filter(|s| s.employee_id == employee_id && s.overlaps(day.start, day.end))
            .cloned()
            .collect())
    }

    async fn find_all_starting_on_day(
        &self,
        day: &DayWindow,
    ) -> Result<Vec<Schedule>, StoreError> {
        let schedules = self.schedules.lock().unwrap();
        Ok(schedules
            .iter()
            .filter(|s| s.starts_within(day.start, day.end))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryAttendanceStore {
    rows: Mutex<BTreeMap<(u64, NaiveDate), Attendance>>,
    next_id: Mutex<u64>,
    broken_employees: Mutex<HashSet<u64>>,
    transient_failures: AtomicU32,
    lost_acks: AtomicU32,
    insert_calls: AtomicU32,
}

impl MemoryAttendanceStore {
    /// Every insert for this employee fails with a non-retryable error.
    pub fn break_employee(&self, employee_id: u64) {
        self.broken_employees.lock().unwrap().insert(employee_id);
    }

    /// The next `n` inserts fail with a transient error.
    pub fn fail_next_inserts(&self, n: u32) {
        self.transient_failures.store(n, Ordering::SeqCst);
    }

    /// The next `n` inserts commit their row, then report a transient error.
    pub fn lose_next_acks(&self, n: u32) {
        self.lost_acks.store(n, Ordering::SeqCst);
    }

    pub fn insert_calls(&self) -> u32 {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn seed(&self, row: NewAttendance) -> Attendance {
        let id = {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            *next_id
        };
        let attendance = row.into_attendance(id);
        self.rows
            .lock()
            .unwrap()
            .insert((attendance.employee_id, attendance.day), attendance.clone());
        attendance
    }

    pub fn all(&self) -> Vec<Attendance> {
        self.rows.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl AttendanceStore for MemoryAttendanceStore {
    async fn find_by_employee_and_day(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> Result<Option<Attendance>, StoreError> {
        Ok(self.rows.lock().unwrap().get(&(employee_id, day)).cloned())
    }

    async fn insert_if_absent(&self, row: &NewAttendance) -> Result<Attendance, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        if self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StoreError::Transient("connection reset".into()));
        }
        if self.broken_employees.lock().unwrap().contains(&row.employee_id) {
            return Err(StoreError::Fatal("disk full".into()));
        }

        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&(row.employee_id, row.day)) {
            return Err(StoreError::Duplicate);
        }
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let attendance = row.clone().into_attendance(*next_id);
        rows.insert((row.employee_id, row.day), attendance.clone());

        if self
            .lost_acks
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StoreError::Transient("connection closed after commit".into()));
        }
        Ok(attendance)
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<Attendance>, StoreError> {
        Ok(self.rows.lock().unwrap().values().find(|a| a.id == id).cloned())
    }

    async fn mark_verified(&self, id: u64) -> Result<Option<Attendance>, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.values_mut().find(|a| a.id == id).map(|a| {
            a.verified = true;
            a.clone()
        }))
    }

    async fn query_range(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Attendance>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.employee_id == employee_id && a.day >= start && a.day <= end)
            .cloned()
            .collect())
    }

    async fn list(&self, filter: &AttendanceFilter) -> Result<Vec<Attendance>, StoreError> {
        let mut rows: Vec<Attendance> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.day.cmp(&a.day).then(b.id.cmp(&a.id)));
        if let Some(limit) = filter.limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }
}
