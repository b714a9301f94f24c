//! Business constants for pricing and scheduling.

use common::Money;
use serde::{Deserialize, Serialize};

/// Fees, tax rates, thresholds and lead times applied by the engine.
///
/// The defaults are the storefront's published terms. Deployments may
/// override individual values through configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    /// Flat fee added to every order, independent of size.
    pub service_fee: Money,

    /// VAT for business customers, in basis points (1900 = 19%).
    pub vat_business_bps: u32,

    /// VAT for private customers, in basis points.
    pub vat_private_bps: u32,

    /// Pre-tax total an order has to reach.
    pub minimum_order: Money,

    /// Smallest guest count accepted on the event-details step.
    pub min_guests: u32,

    /// Guest count from which the longer lead time applies.
    pub large_event_guests: u32,

    /// Lead time in days for regular events.
    pub lead_days: u32,

    /// Lead time in days for large events.
    pub large_event_lead_days: u32,
}

impl PricingPolicy {
    pub const DEFAULT_SERVICE_FEE: Money = Money::from_cents(5_000);
    pub const DEFAULT_MINIMUM_ORDER: Money = Money::from_cents(38_880);

    pub fn with_service_fee(mut self, fee: Money) -> Self {
        self.service_fee = fee;
        self
    }

    pub fn with_minimum_order(mut self, minimum: Money) -> Self {
        self.minimum_order = minimum;
        self
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            service_fee: Self::DEFAULT_SERVICE_FEE,
            vat_business_bps: 1_900,
            vat_private_bps: 700,
            minimum_order: Self::DEFAULT_MINIMUM_ORDER,
            min_guests: 10,
            large_event_guests: 100,
            lead_days: 2,
            large_event_lead_days: 3,
        }
    }
}
