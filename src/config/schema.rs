//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::orchestration::RefundPolicy;
use crate::resilience::BreakerConfig;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Downstream backend base URLs.
    pub backends: BackendsConfig,

    /// Circuit breaker settings, shared by all three breakers.
    pub breaker: BreakerSettings,

    /// Deferred refund-compensation retry settings.
    pub refund: RefundConfig,

    /// Active health check settings.
    pub health_check: HealthCheckConfig,

    /// Timeout configuration for outbound calls and inbound requests.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Base URLs of the three downstream services. Empty values are filled from
/// `FLIGHTS_SERVICE_URL` / `TICKETS_SERVICE_URL` / `PRIVILEGES_SERVICE_URL`
/// at load time; a URL still missing after that is a fatal startup error.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BackendsConfig {
    /// Flight inventory service base URL.
    pub flights_url: String,

    /// Ticket records service base URL.
    pub tickets_url: String,

    /// Bonus/privilege service base URL.
    pub privileges_url: String,
}

/// Circuit breaker settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerSettings {
    /// Failure outcomes within the window that open a circuit.
    pub failure_threshold: usize,

    /// Capacity of the recent-outcomes window.
    pub window_size: usize,

    /// Seconds spent Open before the next call is admitted as a probe.
    pub recovery_timeout_secs: u64,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            window_size: 10,
            recovery_timeout_secs: 20,
        }
    }
}

impl BreakerSettings {
    /// Convert to the breaker's runtime configuration.
    pub fn breaker_config(&self) -> BreakerConfig {
        BreakerConfig {
            failure_threshold: self.failure_threshold,
            window_size: self.window_size,
            recovery_timeout: Duration::from_secs(self.recovery_timeout_secs),
        }
    }
}

/// Deferred refund-compensation retry settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefundConfig {
    /// Seconds between rollback attempts.
    pub retry_interval_secs: u64,

    /// Total seconds before the rollback loop gives up.
    pub retry_deadline_secs: u64,
}

impl Default for RefundConfig {
    fn default() -> Self {
        Self {
            retry_interval_secs: 1,
            retry_deadline_secs: 10,
        }
    }
}

impl RefundConfig {
    /// Convert to the compensator's runtime policy.
    pub fn refund_policy(&self) -> RefundPolicy {
        RefundPolicy {
            retry_interval: Duration::from_secs(self.retry_interval_secs),
            retry_deadline: Duration::from_secs(self.retry_deadline_secs),
        }
    }
}

/// Active health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable active health checks.
    pub enabled: bool,

    /// Health check interval in seconds.
    pub interval_secs: u64,

    /// Health check timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 10,
            timeout_secs: 5,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout for outbound calls, in seconds.
    pub connect_secs: u64,

    /// Total timeout per outbound call, in seconds.
    pub outbound_secs: u64,

    /// Inbound request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            outbound_secs: 10,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
