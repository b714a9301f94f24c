//! Freezes a validated draft into the payload sent to order creation.

use chrono::{NaiveDate, NaiveTime};
use common::{AccessoryId, MenuId, Money, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::draft::{Address, CustomerType, OrderDraft, PaymentMethod, ServiceType};
use crate::navigation::{BlockReason, check_blocking};
use crate::pricing::PriceBreakdown;
use crate::validation::{StepError, ValidationContext, ValidationError, validate_all};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Submission blocked: {0}")]
    Blocked(BlockReason),

    #[error("Draft is invalid: {0}")]
    Invalid(StepError),
}

/// One dish line of the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

/// One accessory line; `unit_price` is charged per guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadAccessory {
    pub accessory_id: AccessoryId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadEvent {
    pub occasion: String,
    pub service_type: ServiceType,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub guest_count: u32,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Immutable order payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub menu_id: MenuId,
    pub event: PayloadEvent,
    pub contact: PayloadContact,
    pub customer_type: CustomerType,
    pub payment_method: PaymentMethod,
    pub items: Vec<PayloadItem>,
    pub accessories: Vec<PayloadAccessory>,
    pub totals: PriceBreakdown,
    /// Company name and special requests, one per line; `None` when both are blank.
    pub notes: Option<String>,
}

/// Builds the order payload after re-checking the blocking conditions and
/// every step of the plan.
pub fn assemble(
    draft: &OrderDraft,
    ctx: &ValidationContext<'_>,
) -> Result<OrderPayload, SubmissionError> {
    if let Some(reason) = check_blocking(ctx, ctx.plan.checkout_index()) {
        return Err(SubmissionError::Blocked(reason));
    }
    validate_all(ctx).map_err(SubmissionError::Invalid)?;

    // validate_all guarantees these are present; a mismatch is reported on its step.
    let missing = |step: usize, error| SubmissionError::Invalid(StepError { step, error });
    let menu_id = draft
        .menu_id
        .clone()
        .ok_or_else(|| missing(1, ValidationError::NoMenuSelected))?;
    let event = &draft.event;
    let (Some(occasion), Some(service_type), Some(date), Some(time)) = (
        event.occasion.clone(),
        event.service_type,
        event.date,
        event.time,
    ) else {
        return Err(missing(0, ValidationError::MissingDate));
    };
    let payment_method = draft.payment_method.ok_or_else(|| {
        missing(ctx.plan.checkout_index(), ValidationError::MissingPaymentMethod)
    })?;

    let items = draft
        .selections
        .iter()
        .map(|selection| PayloadItem {
            product_id: selection.product.id.clone(),
            name: selection.product.name.clone(),
            quantity: selection.quantity,
            unit_price: selection.unit_price(),
        })
        .collect();

    let accessories = draft
        .accessories
        .iter()
        .map(|a| PayloadAccessory {
            accessory_id: a.accessory.id.clone(),
            name: a.accessory.name.clone(),
            quantity: a.quantity,
            unit_price: a.accessory.price,
        })
        .collect();

    Ok(OrderPayload {
        menu_id,
        event: PayloadEvent {
            occasion: occasion.trim().to_string(),
            service_type,
            date,
            time,
            guest_count: event.guest_count,
            address: event.address.clone(),
        },
        contact: PayloadContact {
            first_name: draft.contact.first_name.trim().to_string(),
            last_name: draft.contact.last_name.trim().to_string(),
            email: draft.contact.email.trim().to_string(),
            phone: draft.contact.phone.trim().to_string(),
        },
        customer_type: draft.customer_type,
        payment_method,
        items,
        accessories,
        totals: ctx.breakdown().clone(),
        notes: merge_notes(&draft.contact.company, &draft.contact.special_requests),
    })
}

fn merge_notes(company: &str, special_requests: &str) -> Option<String> {
    let mut lines = Vec::new();
    if !company.trim().is_empty() {
        lines.push(format!("Company: {}", company.trim()));
    }
    if !special_requests.trim().is_empty() {
        lines.push(special_requests.trim().to_string());
    }
    (!lines.is_empty()).then(|| lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use chrono::Days;

    use super::*;
    use crate::catalog::{Accessory, Catalog, ClosedDate, Menu, Product, SystemConstraints};
    use crate::category::CategoryKey;
    use crate::plan::StepPlan;
    use crate::policy::PricingPolicy;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn catalog() -> Catalog {
        Catalog {
            menus: vec![Menu::new("classic", "Classic", Money::from_euros(25)).with_step("main", 1)],
            products: vec![
                Product::new("stew", "Stew", "main", Money::from_cents(900)),
                Product::new("curry", "Curry", "main", Money::from_cents(1100)),
            ],
            accessories: vec![Accessory::new("napkins", "Napkins", Money::from_cents(20))],
        }
    }

    fn ready_draft(catalog: &Catalog) -> OrderDraft {
        let mut draft = OrderDraft::new();
        draft.event.occasion = Some(" corporate ".to_string());
        draft.event.service_type = Some(ServiceType::FullService);
        draft.event.date = today().checked_add_days(Days::new(7));
        draft.event.time = NaiveTime::from_hms_opt(19, 0, 0);
        draft.event.guest_count = 30;
        draft.event.address.postal_code = "20095".to_string();
        draft.menu_id = Some(MenuId::new("classic"));
        for product in &catalog.products {
            draft
                .selections
                .add_or_replace(CategoryKey::Main, product, 1)
                .unwrap();
        }
        draft.set_accessory(&catalog.accessories[0], 1);
        draft.contact.first_name = "Grace".to_string();
        draft.contact.last_name = "Hopper".to_string();
        draft.contact.email = "grace@example.org".to_string();
        draft.contact.phone = "040 123456".to_string();
        draft.contact.company = "Navy".to_string();
        draft.contact.special_requests = "Vegetarian option for 3 guests".to_string();
        draft.customer_type = CustomerType::Business;
        draft.payment_method = Some(PaymentMethod::Invoice);
        draft.terms_accepted = true;
        draft
    }

    fn assemble_with(
        draft: &OrderDraft,
        catalog: &Catalog,
        constraints: &SystemConstraints,
    ) -> Result<OrderPayload, SubmissionError> {
        let plan = StepPlan::build(draft.menu_id.as_ref().and_then(|id| catalog.menu(id)));
        let policy = PricingPolicy::default();
        let ctx = ValidationContext::new(draft, catalog, &plan, constraints, &policy, today());
        assemble(draft, &ctx)
    }

    #[test]
    fn test_assemble_flattens_selections_and_totals() {
        let catalog = catalog();
        let draft = ready_draft(&catalog);
        let payload = assemble_with(&draft, &catalog, &SystemConstraints::default()).unwrap();

        assert_eq!(payload.items.len(), 2);
        assert_eq!(payload.items[0].product_id, ProductId::new("stew"));
        assert_eq!(payload.items[0].unit_price, Money::from_cents(900));
        assert_eq!(payload.accessories.len(), 1);
        assert_eq!(payload.event.occasion, "corporate");
        // 30 × €25 + curry extra €11 + napkins 30 × €0.20 + €50 fee.
        assert_eq!(payload.totals.pre_tax_total, Money::from_cents(75_000 + 1_100 + 600 + 5_000));
        assert_eq!(
            payload.notes.as_deref(),
            Some("Company: Navy\nVegetarian option for 3 guests")
        );
    }

    #[test]
    fn test_assemble_revalidates_every_step() {
        let catalog = catalog();
        let mut draft = ready_draft(&catalog);
        draft.event.address.postal_code = "abc".to_string();

        let err = assemble_with(&draft, &catalog, &SystemConstraints::default()).unwrap_err();
        match err {
            SubmissionError::Invalid(step) => {
                assert_eq!(step.step, 0);
                assert!(matches!(step.error, ValidationError::InvalidPostalCode { .. }));
            }
            other => panic!("expected invalid draft, got {other:?}"),
        }
    }

    #[test]
    fn test_assemble_is_blocked_by_pause_and_closed_date() {
        let catalog = catalog();
        let draft = ready_draft(&catalog);

        let paused = SystemConstraints::paused(None);
        assert!(matches!(
            assemble_with(&draft, &catalog, &paused),
            Err(SubmissionError::Blocked(BlockReason::OrderingPaused { .. }))
        ));

        let closed = SystemConstraints {
            closed_dates: vec![ClosedDate {
                date: draft.event.date.unwrap(),
                reason: Some("Staff holiday".to_string()),
            }],
            ..Default::default()
        };
        assert!(matches!(
            assemble_with(&draft, &catalog, &closed),
            Err(SubmissionError::Blocked(BlockReason::DateClosed { .. }))
        ));
    }

    #[test]
    fn test_notes_are_omitted_when_blank() {
        assert_eq!(merge_notes("  ", ""), None);
        assert_eq!(merge_notes("", "No nuts"), Some("No nuts".to_string()));
    }
}
