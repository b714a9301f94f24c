//! Wizard error types.

use common::{AccessoryId, MenuId, ProductId};
use domain::{BlockReason, CategoryKey, ScheduleError, SelectionError, StepError, SubmissionError};
use services::ServiceError;
use thiserror::Error;

/// Errors from editing the draft through a session.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Unknown menu: {0}")]
    UnknownMenu(MenuId),

    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    #[error("Unknown accessory: {0}")]
    UnknownAccessory(AccessoryId),

    /// The selected menu does not offer the product.
    #[error("Product {product_id} is not offered by menu {menu_id}")]
    NotOffered {
        product_id: ProductId,
        menu_id: MenuId,
    },

    /// The category has no step in the current plan.
    #[error("Category {0} is not part of the current step plan")]
    InactiveCategory(CategoryKey),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

/// Errors from submitting the order.
///
/// None of these touch the draft; the user can fix the problem or retry.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Checkout blocked: {0}")]
    Blocked(BlockReason),

    #[error("Order is incomplete: {0}")]
    Invalid(StepError),

    #[error("Order submission failed: {0}")]
    Gateway(#[source] ServiceError),
}

impl CheckoutError {
    /// Key into the message table for the banner shown to the user.
    pub fn message_key(&self) -> &'static str {
        match self {
            CheckoutError::Blocked(reason) => reason.message_key(),
            CheckoutError::Invalid(step) => step.error.message_key(),
            CheckoutError::Gateway(_) => "notice.submission_failed",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, CheckoutError::Gateway(_))
    }
}

impl From<SubmissionError> for CheckoutError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Blocked(reason) => CheckoutError::Blocked(reason),
            SubmissionError::Invalid(step) => CheckoutError::Invalid(step),
        }
    }
}
