//! HTTP route handlers.

pub mod catalog;
pub mod health;
pub mod orders;
pub mod wizard;
