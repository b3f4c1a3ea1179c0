use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};

use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::envelope;

fn bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?
        .to_str()
        .map_err(|_| "Invalid Authorization header encoding")?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or("Authorization header must be a Bearer token")
}

fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthUser, &'static str> {
    let token = bearer_token(headers)?;
    let claims = verify_token(token, secret).map_err(|e| {
        tracing::debug!(error = %e, "Token rejected");
        "Invalid or expired token"
    })?;
    AuthUser::from_claims(claims).ok_or("Unknown role")
}

/// Verifies the bearer token and stores the caller as `AuthUser` in the
/// request extensions. Failures answer 401 in the usual error envelope.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let authenticated = authenticate(req.headers(), &config.jwt_secret);
    match authenticated {
        Ok(user) => {
            tracing::debug!(user_id = user.user_id, role = ?user.role, "Authenticated request");
            req.extensions_mut().insert(user);
            next.call(req).await
        }
        Err(reason) => {
            tracing::info!(path = %req.path(), reason, "Unauthenticated request");
            let resp = envelope(StatusCode::UNAUTHORIZED, reason);
            Ok(req.into_response(resp.map_into_boxed_body()))
        }
    }
}
