//! Error-to-response mapping.
//!
//! Every `ServiceUnavailable` maps to 503 with the service named in the
//! message, distinguishable from validation (400), ownership (403),
//! invalid-state (400) and not-found (404) outcomes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Plain error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Validation error body with per-field detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationErrorResponse {
    pub message: String,
    pub errors: Vec<String>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorResponse {
                    message,
                    errors: Vec::new(),
                }),
            )
                .into_response(),
            GatewayError::ServiceUnavailable { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    message: self.to_string(),
                }),
            )
                .into_response(),
            GatewayError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    message: self.to_string(),
                }),
            )
                .into_response(),
            GatewayError::Ownership => (
                StatusCode::FORBIDDEN,
                Json(ErrorResponse {
                    message: self.to_string(),
                }),
            )
                .into_response(),
            GatewayError::InvalidState(_) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    message: self.to_string(),
                }),
            )
                .into_response(),
        }
    }
}
