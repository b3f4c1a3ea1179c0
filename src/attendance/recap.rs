use chrono::NaiveDate;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use super::AttendanceService;
use crate::error::AttendanceError;
use crate::model::attendance::{Attendance, AttendanceStatus};

/// Per-status counts of one employee's rows over a date range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Recap {
    #[schema(example = 20)]
    pub hadir: u32,
    #[schema(example = 2)]
    pub telat: u32,
    #[schema(example = 1)]
    pub absen: u32,
    #[schema(example = 0)]
    pub izin: u32,
    #[schema(example = 0)]
    pub sakit: u32,
}

impl Recap {
    pub fn tally<'a>(rows: impl IntoIterator<Item = &'a Attendance>) -> Self {
        rows.into_iter().fold(Recap::default(), |mut recap, row| {
            match row.status {
                AttendanceStatus::Hadir => recap.hadir += 1,
                AttendanceStatus::Terlambat => recap.telat += 1,
                AttendanceStatus::Alfa => recap.absen += 1,
                AttendanceStatus::Izin => recap.izin += 1,
                AttendanceStatus::Sakit => recap.sakit += 1,
            }
            recap
        })
    }
}

impl AttendanceService {
    /// Counts rows with `start <= day <= end`. An inverted range is empty.
    #[instrument(name = "attendance_recap", skip(self))]
    pub async fn recap(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Recap, AttendanceError> {
        if start > end {
            return Ok(Recap::default());
        }

        let rows = self
            .settings
            .retry
            .run("query_range", || {
                self.attendance.query_range(employee_id, start, end)
            })
            .await?;

        Ok(Recap::tally(&rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::testing::{day, fixture, row};
    use crate::model::attendance::AttendanceStatus::*;

    #[actix_web::test]
    async fn counts_rows_by_status_within_range() {
        let fx = fixture(vec![]);
        for (d, status) in [(1, Hadir), (2, Hadir), (3, Hadir), (4, Terlambat), (5, Alfa), (6, Alfa)] {
            fx.attendance.seed(row(10, d, status));
        }
        // outside the range, and another employee
        fx.attendance.seed(row(10, 20, Hadir));
        fx.attendance.seed(row(11, 2, Alfa));

        let recap = fx.service.recap(10, day(1), day(10)).await.unwrap();
        assert_eq!(
            recap,
            Recap {
                hadir: 3,
                telat: 1,
                absen: 2,
                izin: 0,
                sakit: 0
            }
        );
    }

    #[actix_web::test]
    async fn range_bounds_are_inclusive() {
        let fx = fixture(vec![]);
        fx.attendance.seed(row(10, 1, Izin));
        fx.attendance.seed(row(10, 3, Sakit));

        let recap = fx.service.recap(10, day(1), day(3)).await.unwrap();
        assert_eq!(recap.izin, 1);
        assert_eq!(recap.sakit, 1);
    }

    #[actix_web::test]
    async fn empty_range_is_all_zero() {
        let fx = fixture(vec![]);
        fx.attendance.seed(row(10, 5, Hadir));

        assert_eq!(fx.service.recap(10, day(6), day(9)).await.unwrap(), Recap::default());
        assert_eq!(fx.service.recap(10, day(9), day(1)).await.unwrap(), Recap::default());
    }

    #[test]
    fn serializes_with_original_keys() {
        let json = serde_json::to_value(Recap {
            hadir: 3,
            telat: 1,
            absen: 2,
            ..Recap::default()
        })
        .unwrap();
        assert_eq!(json["hadir"], 3);
        assert_eq!(json["telat"], 1);
        assert_eq!(json["absen"], 2);
    }
}
