//! Typed clients for the downstream services.
//!
//! # Data Flow
//! ```text
//! Orchestrator call
//!     → client method builds the request
//!     → breaker.call(...) executes it (or rejects fast)
//!     → 404 on GET maps to Ok(None) before breaker classification
//!     → any other non-2xx or transport error becomes a failure outcome
//! ```
//!
//! # Design Decisions
//! - One long-lived client per backend, one breaker per backend (all
//!   operations of a service share its breaker)
//! - Health probes bypass the breaker so monitoring keeps observing a
//!   backend the breaker has isolated
//! - `rollback_transaction` is the single unguarded mutation (the refund
//!   compensation guards only its read half)

pub mod flight;
pub mod privilege;
pub mod ticket;

pub use flight::FlightClient;
pub use privilege::PrivilegeClient;
pub use ticket::TicketClient;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// One downstream call failure, before the breaker collapses it into the
/// uniform unavailable signal.
#[derive(Debug, Error)]
pub(crate) enum CallError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),
}

/// Reject non-2xx responses. 404 handling, where defined, happens earlier.
pub(crate) fn expect_success(resp: Response) -> Result<Response, CallError> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        Err(CallError::Status(resp.status()))
    }
}

pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: String,
) -> Result<T, CallError> {
    let resp = http.get(&url).send().await?;
    Ok(expect_success(resp)?.json().await?)
}

/// GET where a 404 is a defined absent-value result, not a failure.
pub(crate) async fn get_json_opt<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: String,
) -> Result<Option<T>, CallError> {
    let resp = http.get(&url).send().await?;
    if resp.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    Ok(Some(expect_success(resp)?.json().await?))
}

/// Normalize a configured base URL so path formatting can assume no
/// trailing slash.
pub(crate) fn normalize_base(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}
