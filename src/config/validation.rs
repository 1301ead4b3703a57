//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check backend URLs parse and are present
//! - Validate value ranges (thresholds > 0, window can reach threshold)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single configuration defect.
#[derive(Debug)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the whole configuration, collecting every defect.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: format!("not a valid socket address: {:?}", config.listener.bind_address),
        });
    }

    check_url(&mut errors, "backends.flights_url", &config.backends.flights_url);
    check_url(&mut errors, "backends.tickets_url", &config.backends.tickets_url);
    check_url(
        &mut errors,
        "backends.privileges_url",
        &config.backends.privileges_url,
    );

    if config.breaker.failure_threshold == 0 {
        errors.push(ValidationError {
            field: "breaker.failure_threshold",
            message: "must be at least 1".to_string(),
        });
    }
    if config.breaker.window_size < config.breaker.failure_threshold {
        errors.push(ValidationError {
            field: "breaker.window_size",
            message: "window smaller than failure_threshold can never open the circuit"
                .to_string(),
        });
    }
    if config.breaker.recovery_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "breaker.recovery_timeout_secs",
            message: "must be at least 1".to_string(),
        });
    }

    if config.refund.retry_interval_secs == 0 {
        errors.push(ValidationError {
            field: "refund.retry_interval_secs",
            message: "must be at least 1".to_string(),
        });
    }
    if config.refund.retry_deadline_secs < config.refund.retry_interval_secs {
        errors.push(ValidationError {
            field: "refund.retry_deadline_secs",
            message: "deadline shorter than the retry interval never retries".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.is_empty() {
        errors.push(ValidationError {
            field,
            message: "missing backend address".to_string(),
        });
    } else if Url::parse(value).is_err() {
        errors.push(ValidationError {
            field,
            message: format!("not a valid URL: {value:?}"),
        });
    }
}
