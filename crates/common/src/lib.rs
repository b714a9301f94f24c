//! Shared identifiers and the money type used across the catering order engine.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{AccessoryId, MenuId, OrderId, ProductId};
