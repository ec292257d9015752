//! Server construction and adapter wiring.

mod config;
mod state_builders;

pub use config::RegistrarSettings;
pub use state_builders::build_http_state;

use std::net::SocketAddr;

use actix_web::dev::Server;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};

use registrar::inbound::http::configure;
use registrar::inbound::http::health::HealthState;
use registrar::inbound::http::state::HttpState;

/// Bind and start the HTTP server, marking the service ready once bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    bind_addr: SocketAddr,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(http_state);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(server_health_state.clone())
            .app_data(http_state.clone())
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
