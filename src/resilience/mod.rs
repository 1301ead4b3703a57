//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to backend:
//!     → circuit_breaker.rs (reject fast while Open, else execute)
//!     → On failure: outcome recorded, uniform ServiceUnavailable surfaced
//! ```
//!
//! # Design Decisions
//! - One breaker per backend service, shared by all of its operations
//! - Breakers are explicitly owned and injected, never ambient singletons
//! - Callers never see the raw downstream error once it crosses a breaker

pub mod circuit_breaker;

pub use circuit_breaker::{BreakerConfig, CircuitBreaker, CircuitState};
