//! Service error types.

use std::time::Duration;

use domain::DomainError;
use thiserror::Error;

/// Errors returned by the external collaborators.
///
/// Every variant is recoverable from the wizard's point of view: the draft is
/// left untouched and the user may retry.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The collaborator could not be reached or answered with a failure.
    #[error("{service} unavailable: {reason}")]
    Unavailable {
        service: &'static str,
        reason: String,
    },

    /// The collaborator refused the request.
    #[error("{service} rejected the request: {reason}")]
    Rejected {
        service: &'static str,
        reason: String,
    },

    /// The request was malformed before it was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The call did not complete in time.
    #[error("{operation} timed out after {}ms", after.as_millis())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Domain error, e.g. a malformed catalog document.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl ServiceError {
    pub fn unavailable(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            service,
            reason: reason.into(),
        }
    }

    pub fn rejected(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            service,
            reason: reason.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Convenience type alias for service results.
pub type Result<T> = std::result::Result<T, ServiceError>;
