use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use super::AttendanceService;
use crate::error::AttendanceError;
use crate::model::attendance::{AttendanceStatus, NewAttendance};
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SweepOutcome {
    /// ALFA row written
    Inserted { attendance_id: u64 },
    /// the employee already had a row for the day
    AlreadyPresent,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SweepEntry {
    pub employee_id: u64,
    #[serde(flatten)]
    pub outcome: SweepOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SweepReport {
    #[schema(value_type = String, format = "date")]
    pub day: NaiveDate,
    pub inserted: usize,
    pub already_present: usize,
    pub failed: usize,
    pub entries: Vec<SweepEntry>,
}

impl SweepReport {
    fn new(day: NaiveDate) -> Self {
        Self {
            day,
            inserted: 0,
            already_present: 0,
            failed: 0,
            entries: Vec::new(),
        }
    }

    fn record(&mut self, employee_id: u64, outcome: SweepOutcome) {
        match outcome {
            SweepOutcome::Inserted { .. } => self.inserted += 1,
            SweepOutcome::AlreadyPresent => self.already_present += 1,
            SweepOutcome::Failed { .. } => self.failed += 1,
        }
        self.entries.push(SweepEntry {
            employee_id,
            outcome,
        });
    }
}

impl AttendanceService {
    /// Marks ALFA for every employee scheduled on `target_day` who has no
    /// attendance row for it. Safe to re-run; rows written by an earlier run
    /// or by a racing check-in are reported as `AlreadyPresent`.
    #[instrument(name = "attendance_sweep", skip(self))]
    pub async fn run_daily_sweep(
        &self,
        target_day: NaiveDate,
    ) -> Result<SweepReport, AttendanceError> {
        let _running = self.sweep_lock.lock().await;

        let window = self.clock().day_window(target_day);
        let schedules = self
            .settings
            .retry
            .run("find_all_starting_on_day", || {
                self.schedules.find_all_starting_on_day(&window)
            })
            .await?;

        // one outcome per employee, however many windows they had that day
        let employees: BTreeSet<u64> = schedules.iter().map(|s| s.employee_id).collect();
        let swept_at = Utc::now();

        let mut report = SweepReport::new(target_day);
        for employee_id in employees {
            let outcome = self.mark_absent(employee_id, target_day, swept_at).await;
            if let SweepOutcome::Failed { reason } = &outcome {
                warn!(employee_id, reason = %reason, "Sweep failed for employee");
            }
            report.record(employee_id, outcome);
        }

        info!(
            inserted = report.inserted,
            already_present = report.already_present,
            failed = report.failed,
            "Absence sweep finished"
        );
        Ok(report)
    }

    async fn mark_absent(
        &self,
        employee_id: u64,
        day: NaiveDate,
        swept_at: DateTime<Utc>,
    ) -> SweepOutcome {
        let retry = self.settings.retry;

        match retry
            .run("find_by_employee_and_day", || {
                self.attendance.find_by_employee_and_day(employee_id, day)
            })
            .await
        {
            Ok(Some(_)) => return SweepOutcome::AlreadyPresent,
            Ok(None) => {}
            Err(e) => {
                return SweepOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        }

        let row = NewAttendance {
            employee_id,
            day,
            status: AttendanceStatus::Alfa,
            verified: self.settings.sweep_alfa_verified,
            recorded_at: swept_at,
            schedule_id: None,
        };

        match retry
            .run("insert_if_absent", || self.attendance.insert_if_absent(&row))
            .await
        {
            Ok(attendance) => SweepOutcome::Inserted {
                attendance_id: attendance.id,
            },
            Err(StoreError::Duplicate) => SweepOutcome::AlreadyPresent,
            Err(e) => SweepOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }
}
