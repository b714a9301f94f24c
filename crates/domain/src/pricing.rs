//! Order pricing.
//!
//! ```text
//! menu_subtotal        = price_per_guest × guests         (0 without a menu)
//! extras_subtotal      = Σ allocator extra cost over the plan's active keys
//! subtotal             = menu_subtotal + extras_subtotal
//! accessories_subtotal = Σ price × quantity × guests
//! pre_tax_total        = subtotal + accessories_subtotal + service_fee
//! grand_total          = pre_tax_total + VAT
//! ```
//!
//! The minimum-order threshold is compared against `pre_tax_total`; VAT only
//! appears in the final figure.

use common::Money;
use serde::{Deserialize, Serialize};

use crate::catalog::Menu;
use crate::draft::{AccessorySelection, CustomerType, OrderDraft};
use crate::inclusion::{CategoryAllocation, allocate};
use crate::plan::StepPlan;
use crate::policy::PricingPolicy;
use crate::selection::SelectionStore;

/// Everything the pricing engine reads.
#[derive(Debug, Clone, Copy)]
pub struct PricingInput<'a> {
    pub menu: Option<&'a Menu>,
    pub guest_count: u32,
    pub plan: &'a StepPlan,
    pub selections: &'a SelectionStore,
    pub accessories: &'a [AccessorySelection],
    pub customer_type: CustomerType,
}

impl<'a> PricingInput<'a> {
    /// Reads the pricing inputs of a draft.
    pub fn from_draft(draft: &'a OrderDraft, menu: Option<&'a Menu>, plan: &'a StepPlan) -> Self {
        Self {
            menu,
            guest_count: draft.event.guest_count,
            plan,
            selections: &draft.selections,
            accessories: &draft.accessories,
            customer_type: draft.customer_type,
        }
    }
}

/// Itemized price of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub menu_subtotal: Money,
    pub extras_subtotal: Money,
    pub subtotal: Money,
    pub accessories_subtotal: Money,
    pub service_fee: Money,
    pub pre_tax_total: Money,
    pub vat_rate_bps: u32,
    pub vat_amount: Money,
    pub grand_total: Money,
    /// Allocation per active category key, in step order.
    pub categories: Vec<CategoryAllocation>,
}

impl PriceBreakdown {
    /// Returns true if the pre-tax total reaches the policy minimum.
    pub fn meets_minimum(&self, policy: &PricingPolicy) -> bool {
        self.pre_tax_total >= policy.minimum_order
    }

    /// Amount still missing to reach the minimum order.
    pub fn shortfall(&self, policy: &PricingPolicy) -> Money {
        if self.meets_minimum(policy) {
            Money::zero()
        } else {
            policy.minimum_order - self.pre_tax_total
        }
    }
}

/// VAT rate for a customer type, in basis points.
pub fn vat_rate_bps(customer_type: CustomerType, policy: &PricingPolicy) -> u32 {
    match customer_type {
        CustomerType::Business => policy.vat_business_bps,
        CustomerType::Private => policy.vat_private_bps,
    }
}

/// Prices an order. Pure; the same input always yields the same breakdown.
pub fn quote(input: &PricingInput<'_>, policy: &PricingPolicy) -> PriceBreakdown {
    let menu_subtotal = input
        .menu
        .map(|menu| menu.price_per_guest.multiply(input.guest_count))
        .unwrap_or_default();

    let categories: Vec<CategoryAllocation> = input
        .plan
        .active_keys()
        .into_iter()
        .map(|key| {
            let items = input.selections.items_matching(key, input.plan);
            allocate(key, input.plan.included_for(key), &items)
        })
        .collect();
    let extras_subtotal: Money = categories.iter().map(|c| c.extra_cost).sum();

    let subtotal = menu_subtotal + extras_subtotal;

    let accessories_subtotal: Money = input
        .accessories
        .iter()
        .map(|a| a.cost(input.guest_count))
        .sum();

    let service_fee = policy.service_fee;
    let pre_tax_total = subtotal + accessories_subtotal + service_fee;

    let vat_rate_bps = vat_rate_bps(input.customer_type, policy);
    let vat_amount = pre_tax_total.percentage(vat_rate_bps);
    let grand_total = pre_tax_total + vat_amount;

    PriceBreakdown {
        menu_subtotal,
        extras_subtotal,
        subtotal,
        accessories_subtotal,
        service_fee,
        pre_tax_total,
        vat_rate_bps,
        vat_amount,
        grand_total,
        categories,
    }
}
