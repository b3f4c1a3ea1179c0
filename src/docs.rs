use crate::api::attendance::SweepRequest;
use crate::attendance::recap::Recap;
use crate::attendance::sweep::{SweepEntry, SweepOutcome, SweepReport};
use crate::model::attendance::{Attendance, AttendanceStatus};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Absensi API",
        version = "1.0.0",
        description = r#"
## Attendance determination and reconciliation

- **Check-in**: matches the request time against the employee's shift windows
  for today (WIB by default) and records `HADIR` or, after the 15 minute
  grace period, `TERLAMBAT`.
- **One row per employee per day**, enforced by a unique key in the database.
- **Daily sweep**: marks `ALFA` for every scheduled employee without a row.
- **Verification** and **recap** for admins.

Endpoints are protected using **JWT Bearer authentication**. Tokens are
issued by the authentication service.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::list_attendance,
        crate::api::attendance::filter_attendance,
        crate::api::attendance::history,
        crate::api::attendance::recent_checkins,
        crate::api::attendance::verify,
        crate::api::attendance::recap,
        crate::api::attendance::run_sweep
    ),
    components(
        schemas(
            Attendance,
            AttendanceStatus,
            Recap,
            SweepReport,
            SweepEntry,
            SweepOutcome,
            SweepRequest
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
