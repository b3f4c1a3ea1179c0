use crate::{
    api::attendance,
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{Scope, middleware::from_fn, web};

// Helper to build per-scope limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst size are non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(attendance_scope()),
    );
}

pub fn attendance_scope() -> Scope {
    web::scope("/attendance")
        // /attendance
        .service(web::resource("").route(web::get().to(attendance::list_attendance)))
        .service(web::resource("/check-in").route(web::post().to(attendance::check_in)))
        .service(web::resource("/filter").route(web::get().to(attendance::filter_attendance)))
        .service(web::resource("/history").route(web::get().to(attendance::history)))
        .service(web::resource("/recent").route(web::get().to(attendance::recent_checkins)))
        .service(web::resource("/recap").route(web::get().to(attendance::recap)))
        .service(web::resource("/sweep").route(web::post().to(attendance::run_sweep)))
        // /attendance/{id}/verify
        .service(web::resource("/{id}/verify").route(web::patch().to(attendance::verify)))
}
