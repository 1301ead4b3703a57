//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The original downstream error is logged at the breaker boundary even
//!   though callers only ever see the uniform unavailable signal
//! - Metrics are cheap (atomic updates behind the metrics facade)

pub mod logging;
pub mod metrics;
