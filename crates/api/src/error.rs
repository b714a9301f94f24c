//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{BlockReason, DomainError, StepError};
use services::ServiceError;
use wizard::{CheckoutError, WizardError};

/// API-level error type that maps to HTTP responses.
///
/// Every response body has the shape `{"error": "...", "code": "..."}`;
/// validation failures additionally carry the failing `step`.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// A wizard step failed validation.
    Validation(StepError),
    /// Ordering is paused or the event date is closed.
    Blocked(BlockReason),
    /// A collaborator failed or timed out.
    Service(ServiceError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self {
            ApiError::NotFound(msg) => error_body(StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => error_body(StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Validation(err) => {
                let json = serde_json::json!({
                    "error": err.to_string(),
                    "code": err.error.message_key(),
                    "step": err.step,
                });
                return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(json)).into_response();
            }
            ApiError::Blocked(reason) => {
                error_body(StatusCode::CONFLICT, reason.message_key(), reason.to_string())
            }
            ApiError::Service(err) => service_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
            }
        };
        body.into_response()
    }
}

fn error_body(
    status: StatusCode,
    code: &str,
    message: String,
) -> (StatusCode, axum::Json<serde_json::Value>) {
    let body = serde_json::json!({ "error": message, "code": code });
    (status, axum::Json(body))
}

fn service_error_to_response(err: ServiceError) -> (StatusCode, axum::Json<serde_json::Value>) {
    match &err {
        ServiceError::Timeout { .. } => {
            error_body(StatusCode::GATEWAY_TIMEOUT, "timeout", err.to_string())
        }
        ServiceError::InvalidRequest(_) => {
            error_body(StatusCode::BAD_REQUEST, "bad_request", err.to_string())
        }
        ServiceError::Domain(DomainError::NotFound { .. }) => {
            error_body(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        ServiceError::Unavailable { .. } | ServiceError::Rejected { .. } | ServiceError::Domain(_) => {
            tracing::warn!(error = %err, "collaborator failed");
            error_body(StatusCode::BAD_GATEWAY, "upstream_failed", err.to_string())
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Blocked(reason) => ApiError::Blocked(reason),
            CheckoutError::Invalid(step) => ApiError::Validation(step),
            CheckoutError::Gateway(err) => ApiError::Service(err),
        }
    }
}

/// A draft the session cannot take over (unknown ids, bad quantities) is the
/// client's fault; collaborator failures keep their own mapping.
impl From<WizardError> for ApiError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::Service(err) => ApiError::Service(err),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}
