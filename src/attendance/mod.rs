//! Attendance determination and reconciliation.
//!
//! Every write goes through `AttendanceStore::insert_if_absent`, so the
//! storage-level unique key on `(employee_id, day)` is what decides races
//! between check-ins and the daily sweep. Nothing here takes an in-process
//! lock for that purpose; the sweep mutex only keeps one process from
//! running two sweeps at once.

use std::sync::Arc;

use chrono::Duration;
use tokio::sync::Mutex;

use crate::store::{AttendanceStore, ScheduleStore};
use crate::utils::retry::RetryPolicy;

pub mod checkin;
pub mod clock;
pub mod listing;
pub mod recap;
pub mod sweep;
pub mod verification;

#[cfg(test)]
mod testing;

use clock::ReferenceClock;

/// Tunables of the engine, built from `Config`.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub clock: ReferenceClock,
    /// check-ins later than `window_start + late_grace` are TERLAMBAT
    pub late_grace: Duration,
    /// `verified` written on ALFA rows inserted by the sweep
    pub sweep_alfa_verified: bool,
    pub retry: RetryPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            clock: ReferenceClock::wib(),
            late_grace: Duration::minutes(15),
            sweep_alfa_verified: false,
            retry: RetryPolicy::default(),
        }
    }
}

pub struct AttendanceService {
    schedules: Arc<dyn ScheduleStore>,
    attendance: Arc<dyn AttendanceStore>,
    settings: EngineSettings,
    sweep_lock: Mutex<()>,
}

impl AttendanceService {
    pub fn new(
        schedules: Arc<dyn ScheduleStore>,
        attendance: Arc<dyn AttendanceStore>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            schedules,
            attendance,
            settings,
            sweep_lock: Mutex::new(()),
        }
    }

    pub fn clock(&self) -> &ReferenceClock {
        &self.settings.clock
    }
}
