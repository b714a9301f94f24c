//! Stateful order wizard over the catering order engine.
//!
//! A [`WizardSession`] owns one customer's [`OrderDraft`](domain::OrderDraft),
//! memoizes the step plan for the selected menu, holds the cursor and applies
//! results of asynchronous lookups only while they are still current.
//! [`CheckoutService`] turns a complete draft into exactly one order creation
//! call.

pub mod checkout;
pub mod config;
pub mod error;
pub mod notice;
pub mod session;

pub use checkout::CheckoutService;
pub use config::WizardConfig;
pub use error::{CheckoutError, WizardError};
pub use notice::{Notice, NoticeLevel};
pub use session::{
    CatalogTicket, PostalOutcome, PostalTicket, WizardSession, fetch_catalog, lookup_postal,
};
