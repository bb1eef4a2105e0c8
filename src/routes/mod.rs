pub mod admin;
pub mod auth;
pub mod health;
pub mod matches;
pub mod settings;
pub mod users;
pub mod watchlist;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(matches::matches_routes)
            .configure(users::users_routes)
            .configure(watchlist::watchlist_routes)
            .configure(settings::settings_routes)
            .configure(admin::admin_routes),
    );
}
