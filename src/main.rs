//! flight-gateway entry point.
//!
//! Startup order: config first (the only fatal error class), then logging
//! and metrics, then the component graph, then the listener.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use flight_gateway::config;
use flight_gateway::http::GatewayServer;
use flight_gateway::lifecycle::{signals, Shutdown};
use flight_gateway::observability::{logging, metrics};

/// Command-line options.
#[derive(Debug, Parser)]
#[command(
    name = "flight-gateway",
    version,
    about = "API gateway for the flight booking services"
)]
struct Cli {
    /// Path to a TOML configuration file. Backend URLs may also come from
    /// FLIGHTS_SERVICE_URL, TICKETS_SERVICE_URL and PRIVILEGES_SERVICE_URL.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref())?;
    logging::init(&config.observability.log_level);

    tracing::info!("flight-gateway v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        flights = %config.backends.flights_url,
        tickets = %config.backends.tickets_url,
        privileges = %config.backends.privileges_url,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Arc::new(Shutdown::new());

    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let server = GatewayServer::new(config, shutdown)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
