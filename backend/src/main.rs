//! Backend entry-point: loads settings, wires the HTTP server and serves
//! until shutdown.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use emote_portal::inbound::http::health::HealthState;
use emote_portal::settings::PortalSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = PortalSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let config = ServerConfig::from_settings(settings).map_err(std::io::Error::other)?;
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(server::default_metrics()?));
    let bind_addr = config.bind_addr();

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "emote portal listening");

    let result = server.await;
    health_state.mark_unhealthy();
    info!("server stopped");
    result
}
