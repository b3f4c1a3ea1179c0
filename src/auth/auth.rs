use crate::model::role::Role;
use crate::models::Claims;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

/// Caller identity, placed in request extensions by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("Missing token")),
        )
    }
}

impl AuthUser {
    /// `None` when the token carries a role id this service does not know.
    pub fn from_claims(claims: Claims) -> Option<Self> {
        Some(AuthUser {
            role: Role::from_id(claims.role)?,
            user_id: claims.user_id,
            username: claims.sub,
            employee_id: claims.employee_id,
        })
    }

    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Admin only"))
        }
    }

    /// Sweeps may also be triggered by a system account (external cron).
    pub fn require_admin_or_system(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::Admin | Role::System) {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Admin/System only"))
        }
    }

    /// Employee id of the caller, required for self-service endpoints.
    pub fn require_employee(&self) -> actix_web::Result<u64> {
        self.employee_id
            .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))
    }

    /// Admins may read anyone; employees only themselves.
    pub fn can_read_employee(&self, employee_id: u64) -> bool {
        self.role == Role::Admin || self.employee_id == Some(employee_id)
    }
}
