//! HTTP surface of the gateway.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → server.rs (Axum setup, middleware, shutdown)
//!     → handlers.rs (identity header, request shaping)
//!     → orchestration layer
//!     → response.rs (error taxonomy → status codes)
//! ```

pub mod handlers;
pub mod response;
pub mod server;

pub use server::{AppState, GatewayServer};
