//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe the three backends' health endpoints
//! - Record per-service health gauges and log failures

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::clients::{FlightClient, PrivilegeClient, TicketClient};
use crate::config::HealthCheckConfig;
use crate::observability::metrics;

/// Periodic prober for the downstream services.
pub struct HealthMonitor {
    flights: Arc<FlightClient>,
    tickets: Arc<TicketClient>,
    privileges: Arc<PrivilegeClient>,
    config: HealthCheckConfig,
}

impl HealthMonitor {
    pub fn new(
        flights: Arc<FlightClient>,
        tickets: Arc<TicketClient>,
        privileges: Arc<PrivilegeClient>,
        config: HealthCheckConfig,
    ) -> Self {
        Self {
            flights,
            tickets,
            privileges,
            config,
        }
    }

    /// Probe on a fixed interval until shutdown.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            "Health monitor starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    async fn check_all(&self) {
        self.probe(FlightClient::NAME, self.flights.health()).await;
        self.probe(TicketClient::NAME, self.tickets.health()).await;
        self.probe(PrivilegeClient::NAME, self.privileges.health()).await;
    }

    async fn probe(&self, service: &'static str, check: impl Future<Output = bool>) {
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let healthy = time::timeout(timeout, check).await.unwrap_or(false);
        if !healthy {
            tracing::warn!(service, "Health check failed");
        }
        metrics::record_backend_health(service, healthy);
    }
}
