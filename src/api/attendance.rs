use crate::attendance::AttendanceService;
use crate::attendance::listing::MAX_LIST_LIMIT;
use crate::auth::auth::AuthUser;
use crate::model::attendance::{AttendanceFilter, AttendanceStatus};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams)]
pub struct StatusQuery {
    /// Only rows with this status
    #[param(example = "ALFA")]
    pub status: Option<AttendanceStatus>,
}

#[derive(Deserialize, IntoParams)]
pub struct AttendanceFilterQuery {
    #[param(example = "TERLAMBAT")]
    /// Filter by attendance status
    pub status: Option<AttendanceStatus>,
    #[param(example = 1000)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[param(example = "2026-01-01", value_type = Option<String>, format = "date")]
    /// First day, inclusive
    pub start: Option<NaiveDate>,
    #[param(example = "2026-01-31", value_type = Option<String>, format = "date")]
    /// Last day, inclusive
    pub end: Option<NaiveDate>,
    #[param(example = 50)]
    pub limit: Option<u32>,
}

#[derive(Deserialize, IntoParams)]
pub struct RecentQuery {
    #[param(example = 10)]
    pub limit: Option<u32>,
}

#[derive(Deserialize, IntoParams)]
pub struct RecapQuery {
    /// Defaults to the caller's own employee id
    #[param(example = 1000)]
    pub employee_id: Option<u64>,
    #[param(example = "2026-01-01", value_type = String, format = "date")]
    pub start: NaiveDate,
    #[param(example = "2026-01-31", value_type = String, format = "date")]
    pub end: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct SweepRequest {
    /// Day to sweep; defaults to yesterday in the reference timezone
    #[schema(example = "2026-01-05", value_type = Option<String>, format = "date")]
    pub day: Option<NaiveDate>,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    responses(
        (status = 201, description = "Checked in", body = Object, example = json!({
            "message": "Checked in, waiting for admin verification",
            "data": {
                "id": 1,
                "employee_id": 1000,
                "day": "2026-01-05",
                "status": "HADIR",
                "verified": false,
                "recorded_at": "2026-01-05T01:05:00Z",
                "schedule_id": 12
            }
        })),
        (status = 404, description = "No schedule today, or no shift window contains now"),
        (status = 409, description = "Already checked in today"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;

    let attendance = service.checkin(employee_id, Utc::now()).await?;

    let message = if attendance.status == AttendanceStatus::Terlambat {
        "Checked in late, waiting for admin verification"
    } else {
        "Checked in, waiting for admin verification"
    };

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": message,
        "data": attendance
    })))
}

/// List attendance, optionally by status (admin)
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(StatusQuery),
    responses(
        (status = 200, description = "Attendance rows, newest first", body = [Attendance]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    query: web::Query<StatusQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let rows = service
        .list_attendance(AttendanceFilter {
            status: query.status,
            ..Default::default()
        })
        .await?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Filter attendance by status, employee and date range (admin)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/filter",
    params(AttendanceFilterQuery),
    responses(
        (status = 200, description = "Matching rows, newest first", body = [Attendance]),
        (status = 400, description = "start is after end"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn filter_attendance(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    query: web::Query<AttendanceFilterQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let query = query.into_inner();
    let rows = service
        .list_attendance(AttendanceFilter {
            status: query.status,
            employee_id: query.employee_id,
            start: query.start,
            end: query.end,
            limit: query.limit,
            ..Default::default()
        })
        .await?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Caller's own attendance history
#[utoipa::path(
    get,
    path = "/api/v1/attendance/history",
    responses(
        (status = 200, description = "Own attendance rows, newest first", body = [Attendance]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn history(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;

    let rows = service.employee_history(employee_id).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// Latest check-ins for the dashboard (admin)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/recent",
    params(RecentQuery),
    responses(
        (status = 200, description = "Latest HADIR/TERLAMBAT rows", body = [Attendance]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn recent_checkins(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    query: web::Query<RecentQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let limit = query.limit.unwrap_or(10).min(MAX_LIST_LIMIT);
    let rows = service.recent_checkins(limit).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// Verify an attendance row (admin)
#[utoipa::path(
    patch,
    path = "/api/v1/attendance/{attendance_id}/verify",
    params(
        ("attendance_id" = u64, Path, description = "ID of the attendance row to verify")
    ),
    responses(
        (status = 200, description = "Verified (also when it already was)", body = Attendance),
        (status = 404, description = "Attendance not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn verify(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let attendance = service.verify(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(attendance))
}

/// Per-status counts over a date range
#[utoipa::path(
    get,
    path = "/api/v1/attendance/recap",
    params(RecapQuery),
    responses(
        (status = 200, description = "Counts by status", body = Recap),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn recap(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    query: web::Query<RecapQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = match query.employee_id {
        Some(id) => id,
        None => auth.require_employee()?,
    };

    if !auth.can_read_employee(employee_id) {
        return Err(actix_web::error::ErrorForbidden("Admin only"));
    }

    let recap = service.recap(employee_id, query.start, query.end).await?;
    Ok(HttpResponse::Ok().json(recap))
}

/// Run the absence sweep for one day (admin / system)
#[utoipa::path(
    post,
    path = "/api/v1/attendance/sweep",
    request_body(
        content = SweepRequest,
        description = "Day to sweep",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Per-employee sweep outcome", body = SweepReport),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Schedules could not be read")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn run_sweep(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    payload: web::Json<SweepRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin_or_system()?;

    let day = payload
        .day
        .unwrap_or_else(|| service.clock().previous_day(Utc::now()));

    tracing::info!(%day, user_id = auth.user_id, "Manual absence sweep requested");
    let report = service.run_daily_sweep(day).await?;
    Ok(HttpResponse::Ok().json(report))
}
