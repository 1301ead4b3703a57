//! Flight booking API gateway.
//!
//! Fronts three independent backends (flight inventory, ticket records,
//! bonus/privilege balances) and keeps serving partial results when one or
//! more of them is slow or failing.
//!
//! ```text
//! Inbound request
//!     → http (router, handlers)
//!     → orchestration (purchase / refund / aggregation)
//!     → clients (one typed client per backend)
//!     → resilience (per-service circuit breaker)
//!     → backend
//! ```
//!
//! Failures flow back up as the typed `ServiceUnavailable` signal, never as
//! the raw transport error, once they cross a breaker boundary.

// Core subsystems
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod orchestration;
pub mod resilience;

// Cross-cutting concerns
pub mod health;
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
