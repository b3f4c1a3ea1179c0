use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::{AttendanceService, EngineSettings};
use crate::model::attendance::{AttendanceStatus, NewAttendance};
use crate::model::schedule::Schedule;
use crate::store::memory::{MemoryAttendanceStore, MemoryScheduleStore};
use crate::utils::retry::RetryPolicy;

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
}

/// Instant of `hh:mm` WIB on January `d`.
pub fn wib(d: u32, hh: u32, mm: u32) -> DateTime<Utc> {
    EngineSettings::default()
        .clock
        .at(day(d), NaiveTime::from_hms_opt(hh, mm, 0).unwrap())
}

/// 08:00-16:00 WIB shift on January `d`.
pub fn shift(id: u64, employee_id: u64, d: u32) -> Schedule {
    window(id, employee_id, wib(d, 8, 0), wib(d, 16, 0))
}

pub fn window(id: u64, employee_id: u64, start: DateTime<Utc>, end: DateTime<Utc>) -> Schedule {
    Schedule {
        id,
        employee_id,
        window_start: start,
        window_end: end,
        shift_label: format!("shift-{id}"),
    }
}

pub fn row(employee_id: u64, d: u32, status: AttendanceStatus) -> NewAttendance {
    NewAttendance {
        employee_id,
        day: day(d),
        status,
        verified: false,
        recorded_at: wib(d, 9, 0),
        schedule_id: None,
    }
}

pub struct Fixture {
    pub service: AttendanceService,
    pub attendance: Arc<MemoryAttendanceStore>,
}

pub fn fixture(schedules: Vec<Schedule>) -> Fixture {
    fixture_with(schedules, EngineSettings::default())
}

pub fn fixture_with(schedules: Vec<Schedule>, mut settings: EngineSettings) -> Fixture {
    settings.retry = RetryPolicy {
        attempts: settings.retry.attempts,
        backoff: StdDuration::ZERO,
    };
    let attendance = Arc::new(MemoryAttendanceStore::default());
    let service = AttendanceService::new(
        Arc::new(MemoryScheduleStore::with(schedules)),
        attendance.clone(),
        settings,
    );
    Fixture {
        service,
        attendance,
    }
}
