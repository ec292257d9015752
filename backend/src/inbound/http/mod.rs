//! HTTP inbound adapter exposing REST endpoints.

pub mod doc;
pub mod error;
pub mod health;
pub mod registrations;
pub mod state;

use actix_web::web;

pub use error::ApiResult;

/// Register the API scope, health checks and JSON error handling.
///
/// Callers provide `web::Data<HttpState>` and `web::Data<HealthState>`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use registrar::inbound::http::configure;
///
/// let app = App::new().configure(configure);
/// ```
pub fn configure(config: &mut web::ServiceConfig) {
    config
        .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .service(
            web::scope("/api/v1")
                .service(registrations::reconcile_registrations)
                .service(registrations::register_user),
        )
        .service(health::ready)
        .service(health::live);
}
