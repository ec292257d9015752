//! Registrar entry-point: loads settings, wires adapters and serves HTTP.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::WrapErr;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use registrar::inbound::http::health::HealthState;
use server::{RegistrarSettings, build_http_state, create_server};

#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = RegistrarSettings::load().wrap_err("load registrar settings")?;
    let bind_addr = settings.bind_addr()?;
    let http_state = build_http_state(&settings, Arc::new(DefaultClock))
        .await
        .wrap_err("initialise application state")?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), http_state, bind_addr)
        .wrap_err_with(|| format!("bind {bind_addr}"))?;
    info!(%bind_addr, "registrar listening");

    let result = server.await;
    health_state.mark_unhealthy();
    result.wrap_err("http server terminated")
}
