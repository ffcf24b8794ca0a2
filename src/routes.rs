use crate::{
    api::{events, reports, scan, users},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let scan_limiter = Arc::new(build_limiter(config.rate_scan_per_min));
    let admin_limiter = Arc::new(build_limiter(config.rate_admin_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            // the software scan source; hardware readers use the TCP listener
            .service(
                web::resource("/scan")
                    .wrap(scan_limiter.clone())
                    .route(web::post().to(scan::scan_card)),
            )
            .service(
                web::scope("/users")
                    .wrap(admin_limiter.clone())
                    // /users
                    .service(
                        web::resource("")
                            .route(web::post().to(users::add_user))
                            .route(web::get().to(users::list_users)),
                    )
                    // /users/{uid}
                    .service(web::resource("/{uid}").route(web::delete().to(users::remove_user))),
            )
            .service(
                web::scope("/reports")
                    .service(
                        web::resource("/{date}/summary").route(web::get().to(reports::daily_summary)),
                    )
                    .service(
                        web::resource("/{date}/detail").route(web::get().to(reports::daily_detail)),
                    ),
            )
            .service(
                web::scope("/events")
                    .service(web::resource("/last").route(web::get().to(events::last_event)))
                    .service(web::resource("/last-uid").route(web::get().to(events::last_uid))),
            ),
    );
}
