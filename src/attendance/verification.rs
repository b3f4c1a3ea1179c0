use tracing::{info, instrument};

use super::AttendanceService;
use crate::error::AttendanceError;
use crate::model::attendance::Attendance;

impl AttendanceService {
    /// Admin confirmation. Idempotent: verifying twice is not an error.
    #[instrument(name = "attendance_verify", skip(self))]
    pub async fn verify(&self, attendance_id: u64) -> Result<Attendance, AttendanceError> {
        let verified = self
            .settings
            .retry
            .run("mark_verified", || self.attendance.mark_verified(attendance_id))
            .await?;

        match verified {
            Some(attendance) => {
                info!(employee_id = attendance.employee_id, "Attendance verified");
                Ok(attendance)
            }
            None => Err(AttendanceError::not_found("attendance not found")),
        }
    }
}
