//! Gateway error taxonomy.
//!
//! Every failure that crosses a circuit-breaker boundary is collapsed into
//! `ServiceUnavailable` carrying only the service name. The remaining
//! variants are request-level outcomes produced above that boundary.

use thiserror::Error;

/// Errors surfaced by gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Breaker is open or the downstream call failed. The original cause is
    /// logged at the client boundary and never carried upward.
    #[error("{service} unavailable")]
    ServiceUnavailable {
        /// Human-readable service name (e.g. "Flights Service").
        service: &'static str,
    },

    /// A referenced entity (flight, user) does not exist.
    #[error("{0}")]
    Validation(String),

    /// The requested entity was not found.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The ticket does not belong to the requesting user.
    #[error("ticket does not belong to the user")]
    Ownership,

    /// The operation is not permitted given the entity's current status.
    #[error("{0}")]
    InvalidState(String),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    /// Shorthand for the breaker/downstream failure signal.
    pub fn unavailable(service: &'static str) -> Self {
        Self::ServiceUnavailable { service }
    }

    /// True if this error represents a degraded-dependency condition that
    /// aggregation reads may soften into a partial response.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_display() {
        let err = GatewayError::unavailable("Bonus Service");
        assert_eq!(err.to_string(), "Bonus Service unavailable");
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_not_found_display() {
        let err = GatewayError::NotFound("ticket");
        assert_eq!(err.to_string(), "ticket not found");
        assert!(!err.is_unavailable());
    }
}
