use super::AttendanceService;
use crate::error::AttendanceError;
use crate::model::attendance::{Attendance, AttendanceFilter, AttendanceStatus};

/// Upper bound for any listing that asks for a limit.
pub const MAX_LIST_LIMIT: u32 = 500;

impl AttendanceService {
    pub async fn list_attendance(
        &self,
        filter: AttendanceFilter,
    ) -> Result<Vec<Attendance>, AttendanceError> {
        if let (Some(start), Some(end)) = (filter.start, filter.end) {
            if start > end {
                return Err(AttendanceError::validation("start cannot be after end"));
            }
        }

        let filter = AttendanceFilter {
            limit: filter.limit.map(|l| l.clamp(1, MAX_LIST_LIMIT)),
            ..filter
        };

        Ok(self
            .settings
            .retry
            .run("list", || self.attendance.list(&filter))
            .await?)
    }

    pub async fn employee_history(
        &self,
        employee_id: u64,
    ) -> Result<Vec<Attendance>, AttendanceError> {
        self.list_attendance(AttendanceFilter {
            employee_id: Some(employee_id),
            ..Default::default()
        })
        .await
    }

    /// Latest check-ins for the admin dashboard.
    pub async fn recent_checkins(&self, limit: u32) -> Result<Vec<Attendance>, AttendanceError> {
        self.list_attendance(AttendanceFilter {
            statuses: vec![AttendanceStatus::Hadir, AttendanceStatus::Terlambat],
            limit: Some(limit),
            ..Default::default()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::testing::{day, fixture, row};
    use crate::model::attendance::AttendanceStatus::*;

    #[actix_web::test]
    async fn filters_by_status() {
        let fx = fixture(vec![]);
        fx.attendance.seed(row(10, 1, Hadir));
        fx.attendance.seed(row(11, 1, Alfa));
        fx.attendance.seed(row(12, 1, Alfa));

        let alfa = fx
            .service
            .list_attendance(AttendanceFilter {
                status: Some(Alfa),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(alfa.len(), 2);
        assert!(alfa.iter().all(|a| a.status == Alfa));

        let all = fx.service.list_attendance(AttendanceFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[actix_web::test]
    async fn history_is_newest_first() {
        let fx = fixture(vec![]);
        fx.attendance.seed(row(10, 1, Hadir));
        fx.attendance.seed(row(10, 3, Terlambat));
        fx.attendance.seed(row(11, 2, Hadir));

        let history = fx.service.employee_history(10).await.unwrap();
        let days: Vec<_> = history.iter().map(|a| a.day).collect();
        assert_eq!(days, vec![day(3), day(1)]);
    }

    #[actix_web::test]
    async fn recent_checkins_skip_absences_and_respect_limit() {
        let fx = fixture(vec![]);
        fx.attendance.seed(row(10, 1, Hadir));
        fx.attendance.seed(row(10, 2, Alfa));
        fx.attendance.seed(row(10, 3, Terlambat));
        fx.attendance.seed(row(10, 4, Hadir));

        let recent = fx.service.recent_checkins(2).await.unwrap();
        let days: Vec<_> = recent.iter().map(|a| a.day).collect();
        assert_eq!(days, vec![day(4), day(3)]);
    }

    #[actix_web::test]
    async fn inverted_date_filter_is_rejected() {
        let fx = fixture(vec![]);
        let err = fx
            .service
            .list_attendance(AttendanceFilter {
                start: Some(day(5)),
                end: Some(day(1)),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::Validation(_)));
    }
}
