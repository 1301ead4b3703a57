//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all gateway handlers
//! - Wire up middleware (timeout, tracing, request metrics)
//! - Construct the downstream clients, breakers and orchestrators
//! - Spawn the health monitor
//! - Serve with graceful shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::clients::{FlightClient, PrivilegeClient, TicketClient};
use crate::config::GatewayConfig;
use crate::health::HealthMonitor;
use crate::http::handlers;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::orchestration::{AggregationReader, PurchaseOrchestrator, RefundCompensator};
use crate::resilience::CircuitBreaker;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub flights: Arc<FlightClient>,
    pub reader: Arc<AggregationReader>,
    pub purchases: Arc<PurchaseOrchestrator>,
    pub refunds: Arc<RefundCompensator>,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    flights: Arc<FlightClient>,
    tickets: Arc<TicketClient>,
    privileges: Arc<PrivilegeClient>,
    shutdown: Arc<Shutdown>,
}

impl GatewayServer {
    /// Build the full component graph from configuration: one breaker per
    /// backend (constructed here, injected into its client), the three
    /// clients, and the orchestrators on top of them.
    pub fn new(config: GatewayConfig, shutdown: Arc<Shutdown>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .timeout(Duration::from_secs(config.timeouts.outbound_secs))
            .build()?;

        let breaker_config = config.breaker.breaker_config();
        let flights = Arc::new(FlightClient::new(
            &config.backends.flights_url,
            http.clone(),
            Arc::new(CircuitBreaker::new(FlightClient::NAME, breaker_config)),
        ));
        let tickets = Arc::new(TicketClient::new(
            &config.backends.tickets_url,
            http.clone(),
            Arc::new(CircuitBreaker::new(TicketClient::NAME, breaker_config)),
        ));
        let privileges = Arc::new(PrivilegeClient::new(
            &config.backends.privileges_url,
            http,
            Arc::new(CircuitBreaker::new(PrivilegeClient::NAME, breaker_config)),
        ));

        let state = AppState {
            flights: flights.clone(),
            reader: Arc::new(AggregationReader::new(
                flights.clone(),
                tickets.clone(),
                privileges.clone(),
            )),
            purchases: Arc::new(PurchaseOrchestrator::new(
                flights.clone(),
                tickets.clone(),
                privileges.clone(),
            )),
            refunds: Arc::new(RefundCompensator::new(
                tickets.clone(),
                privileges.clone(),
                config.refund.refund_policy(),
                shutdown.clone(),
            )),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            flights,
            tickets,
            privileges,
            shutdown,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/v1/flights", get(handlers::list_flights))
            .route(
                "/api/v1/tickets",
                get(handlers::list_tickets).post(handlers::buy_ticket),
            )
            .route(
                "/api/v1/tickets/{ticket_uid}",
                get(handlers::get_ticket).delete(handlers::cancel_ticket),
            )
            .route("/api/v1/me", get(handlers::user_info))
            .route("/api/v1/privilege", get(handlers::privilege_info))
            .route("/manage/health", get(handlers::health))
            .with_state(state)
            .layer(middleware::from_fn(track_metrics))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        if self.config.health_check.enabled {
            let monitor = HealthMonitor::new(
                self.flights.clone(),
                self.tickets.clone(),
                self.privileges.clone(),
                self.config.health_check.clone(),
            );
            let shutdown_rx = self.shutdown.subscribe();
            tokio::spawn(async move {
                monitor.run(shutdown_rx).await;
            });
        }

        let mut shutdown_rx = self.shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Record method/status/latency for every handled request.
async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
