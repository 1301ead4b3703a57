//! Business orchestration over the downstream clients.
//!
//! # Data Flow
//! ```text
//! Handler
//!     → purchase.rs (buy: lookups, payment split, ledger write, ticket)
//!     → refund.rs (cancel: delete now, roll back the ledger later)
//!     → aggregation.rs (combined views with per-section degradation)
//! ```
//!
//! # Design Decisions
//! - Orchestrators hold Arc'd clients; no orchestrator talks HTTP directly
//! - ServiceUnavailable propagates, except where a view explicitly degrades
//! - No distributed transactions: the refund path compensates, the purchase
//!   path accepts its ordering gap (see DESIGN.md)

pub mod aggregation;
pub mod purchase;
pub mod refund;

pub use aggregation::AggregationReader;
pub use purchase::PurchaseOrchestrator;
pub use refund::{RefundCompensator, RefundPolicy};
