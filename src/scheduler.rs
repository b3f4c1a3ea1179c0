//! Daily trigger for the absence sweep. Owns only the timing; the sweep body
//! lives in `AttendanceService::run_daily_sweep` and can be called directly.

use std::sync::Arc;

use chrono::{NaiveTime, Utc};
use tracing::{error, info};

use crate::attendance::AttendanceService;

/// Sleeps until the next `at` (reference wall-clock time), sweeps the
/// previous reference day, and repeats.
pub fn spawn_daily_sweep(service: Arc<AttendanceService>, at: NaiveTime) {
    actix_web::rt::spawn(async move {
        let clock = *service.clock();
        loop {
            let now = Utc::now();
            let next = clock.next_occurrence(now, at);
            info!(next_run = %next, "Absence sweep scheduled");

            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            let target_day = clock.previous_day(Utc::now());
            info!(%target_day, "[CRON] Marking ALFA");
            match service.run_daily_sweep(target_day).await {
                Ok(report) => info!(
                    %target_day,
                    inserted = report.inserted,
                    failed = report.failed,
                    "[CRON] Finished marking ALFA"
                ),
                Err(e) => error!(%target_day, error = %e, "[CRON] Absence sweep aborted"),
            }
        }
    });
}
