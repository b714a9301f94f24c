//! Domain error types.

use thiserror::Error;

use crate::category::UnknownCategory;
use crate::schedule::ScheduleError;
use crate::selection::SelectionError;
use crate::submission::SubmissionError;
use crate::validation::StepError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A selection edit was rejected.
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    /// An event date violates the lead time.
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// A wizard step failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] StepError),

    /// The draft could not be turned into an order payload.
    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    /// A category label did not match any known key.
    #[error(transparent)]
    Category(#[from] UnknownCategory),

    /// Catalog entity not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
