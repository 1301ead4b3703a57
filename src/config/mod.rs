//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! TOML file (optional) → schema.rs (serde defaults)
//!     → loader.rs (env overrides for backend URLs)
//!     → validation.rs (all errors reported, fatal before serving)
//! ```

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BackendsConfig, BreakerSettings, GatewayConfig, HealthCheckConfig, ListenerConfig,
    ObservabilityConfig, RefundConfig, TimeoutConfig,
};
