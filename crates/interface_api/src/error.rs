//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_fees::FeeError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request parameters failed validation
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Vec<String>,
    },

    /// Stored fee data could not be read as a ledger
    #[error("Invalid fee data: {0}")]
    InvalidFeeData(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Validation { message, details } => {
                (StatusCode::BAD_REQUEST, "validation_error", message, Some(details))
            }
            ApiError::InvalidFeeData(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_fee_data", msg, None)
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg, None)
            }
            ApiError::Internal(msg) => {
                error!(message = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<FeeError> for ApiError {
    fn from(err: FeeError) -> Self {
        match err {
            FeeError::Validation(e) => ApiError::InvalidFeeData(e.to_string()),
            FeeError::PaymentNotFound(id) => ApiError::NotFound(format!("Payment {} not found", id)),
            FeeError::Port(e @ PortError::Malformed { .. }) => ApiError::InvalidFeeData(e.to_string()),
            FeeError::Port(e) if e.is_not_found() => ApiError::NotFound(e.to_string()),
            FeeError::Port(e) if e.is_transient() => ApiError::ServiceUnavailable(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        details.sort();

        ApiError::Validation {
            message: "Invalid request parameters".to_string(),
            details,
        }
    }
}
