//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_breaker_state` (gauge): 0=closed, 1=open, 2=half-open
//! - `gateway_breaker_rejections_total` (counter): fail-fast rejections
//! - `gateway_backend_health` (gauge): 1=healthy, 0=unhealthy

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::CircuitState;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(err) => tracing::error!(error = %err, "Failed to install metrics exporter"),
    }
}

/// Record one handled request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("gateway_requests_total", &labels).increment(1);
    metrics::histogram!("gateway_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record a breaker state transition.
pub fn record_breaker_state(service: &'static str, state: CircuitState) {
    let value = match state {
        CircuitState::Closed => 0.0,
        CircuitState::Open => 1.0,
        CircuitState::HalfOpen => 2.0,
    };
    metrics::gauge!("gateway_breaker_state", "service" => service).set(value);
}

/// Record a call rejected while the breaker is open.
pub fn record_breaker_rejection(service: &'static str) {
    metrics::counter!("gateway_breaker_rejections_total", "service" => service).increment(1);
}

/// Record an active health probe result.
pub fn record_backend_health(service: &'static str, healthy: bool) {
    metrics::gauge!("gateway_backend_health", "service" => service)
        .set(if healthy { 1.0 } else { 0.0 });
}
