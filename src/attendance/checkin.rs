use chrono::{DateTime, Duration, Utc};
use tracing::{info, instrument};

use super::AttendanceService;
use crate::error::AttendanceError;
use crate::model::attendance::{Attendance, AttendanceStatus, NewAttendance};
use crate::model::schedule::Schedule;
use crate::store::StoreError;

/// Picks the earliest window (by start) containing `at` and grades the
/// arrival against `window_start + grace`. Exactly at the boundary is still
/// on time. `None` when no window contains `at`.
pub fn decide_status<'a>(
    windows: &'a [Schedule],
    at: DateTime<Utc>,
    grace: Duration,
) -> Option<(&'a Schedule, AttendanceStatus)> {
    let mut ordered: Vec<&Schedule> = windows.iter().collect();
    ordered.sort_by_key(|s| (s.window_start, s.id));

    let schedule = ordered.into_iter().find(|s| s.contains(at))?;
    let status = if at > schedule.window_start + grace {
        AttendanceStatus::Terlambat
    } else {
        AttendanceStatus::Hadir
    };
    Some((schedule, status))
}

impl AttendanceService {
    #[instrument(name = "attendance_checkin", skip(self), fields(day = tracing::field::Empty))]
    pub async fn checkin(
        &self,
        employee_id: u64,
        request_time: DateTime<Utc>,
    ) -> Result<Attendance, AttendanceError> {
        let retry = self.settings.retry;
        let today = self.clock().day_window(self.clock().day_of(request_time));
        tracing::Span::current().record("day", tracing::field::display(today.day));

        // 1️⃣ shift windows covering today
        let windows = retry
            .run("find_covering_day", || {
                self.schedules.find_covering_day(employee_id, &today)
            })
            .await?;

        if windows.is_empty() {
            info!("Check-in rejected: no schedule today");
            return Err(AttendanceError::not_found("no schedule today"));
        }

        // 2️⃣ fast path for the common duplicate; the insert below is the real guard
        let existing = retry
            .run("find_by_employee_and_day", || {
                self.attendance.find_by_employee_and_day(employee_id, today.day)
            })
            .await?;

        if existing.is_some() {
            info!("Check-in rejected: already checked in");
            return Err(AttendanceError::conflict("already checked in"));
        }

        // 3️⃣ match the request time against the windows
        let Some((schedule, status)) = decide_status(&windows, request_time, self.settings.late_grace)
        else {
            info!(windows = windows.len(), "Check-in rejected: outside every shift window");
            return Err(AttendanceError::not_found(
                "no shift window contains the check-in time",
            ));
        };

        // overnight shifts are filed under the day they started
        let shift_day = self.clock().shift_day(schedule);
        let row = NewAttendance {
            employee_id,
            day: shift_day,
            status,
            verified: false,
            recorded_at: request_time,
            schedule_id: Some(schedule.id),
        };

        // 4️⃣ guarded insert
        let mut attempts = 0u32;
        let inserted = retry
            .run("insert_if_absent", || {
                attempts += 1;
                self.attendance.insert_if_absent(&row)
            })
            .await;

        match inserted {
            Ok(attendance) => {
                info!(
                    attendance_id = attendance.id,
                    schedule_id = schedule.id,
                    status = %status,
                    "Check-in recorded"
                );
                Ok(attendance)
            }
            Err(StoreError::Duplicate) if attempts > 1 => {
                // an earlier attempt may have committed before its connection dropped
                let existing = retry
                    .run("find_by_employee_and_day", || {
                        self.attendance.find_by_employee_and_day(employee_id, shift_day)
                    })
                    .await?;

                match existing {
                    Some(attendance) if is_same_checkin(&attendance, &row) => {
                        info!(
                            attendance_id = attendance.id,
                            attempts, "Check-in recorded by an earlier attempt"
                        );
                        Ok(attendance)
                    }
                    _ => {
                        info!("Check-in lost the race for the shift day");
                        Err(AttendanceError::conflict("already checked in"))
                    }
                }
            }
            Err(StoreError::Duplicate) => {
                info!("Check-in lost the race for the shift day");
                Err(AttendanceError::conflict("already checked in"))
            }
            Err(e) => {
                tracing::error!(error = %e, "Check-in insert failed");
                Err(e.into())
            }
        }
    }
}

/// `recorded_at` is stored with microsecond precision.
fn is_same_checkin(existing: &Attendance, row: &NewAttendance) -> bool {
    existing.employee_id == row.employee_id
        && existing.day == row.day
        && existing.status == row.status
        && existing.schedule_id == row.schedule_id
        && existing.recorded_at.timestamp_micros() == row.recorded_at.timestamp_micros()
}
