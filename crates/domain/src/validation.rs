//! Per-step validation.
//!
//! Every rule returns a typed [`ValidationError`] value tied to a field and a
//! message key. Nothing here panics on bad input.

use std::sync::LazyLock;

use chrono::NaiveDate;
use common::{MenuId, Money};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, Menu, SystemConstraints};
use crate::category::CategoryKey;
use crate::draft::{CardDetails, OrderDraft, PaymentMethod};
use crate::plan::{StepPlan, WizardStep};
use crate::policy::PricingPolicy;
use crate::pricing::{PriceBreakdown, PricingInput, quote};
use crate::schedule::earliest_event_date;

static POSTAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}$").expect("postal code pattern is valid"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("email pattern is valid")
});

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ()/\-]+$").expect("phone pattern is valid"));

static CARD_EXPIRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/\d{2}$").expect("expiry pattern is valid"));

/// The draft field a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Occasion,
    ServiceType,
    EventDate,
    EventTime,
    GuestCount,
    PostalCode,
    Menu,
    Selections,
    OrderTotal,
    FirstName,
    LastName,
    Email,
    Phone,
    Company,
    PaymentMethod,
    CardNumber,
    CardExpiry,
    CardCvc,
    CardHolder,
    Terms,
}

/// A rule a step failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("Occasion type is required")]
    MissingOccasion,

    #[error("Service type is required")]
    MissingServiceType,

    #[error("Event date is required")]
    MissingDate,

    #[error("Event date {date} is before the earliest possible date {earliest}")]
    DateTooSoon { date: NaiveDate, earliest: NaiveDate },

    #[error("Event time is required")]
    MissingTime,

    #[error("At least {minimum} guests are required (got {actual})")]
    TooFewGuests { minimum: u32, actual: u32 },

    #[error("Postal code {postal_code:?} is not a 5-digit code")]
    InvalidPostalCode { postal_code: String },

    #[error("No menu selected")]
    NoMenuSelected,

    #[error("Menu {menu_id} is not available")]
    UnknownMenu { menu_id: MenuId },

    #[error("Menu requires at least {minimum} guests (got {actual})")]
    BelowMenuMinimum { minimum: u32, actual: u32 },

    #[error("Select at least {required} {key} dishes (selected {selected})")]
    NotEnoughSelections {
        key: CategoryKey,
        required: u32,
        selected: u32,
    },

    #[error("Minimum order value is {minimum} before tax (current total {pre_tax_total})")]
    BelowMinimumOrder {
        minimum: Money,
        pre_tax_total: Money,
    },

    #[error("First name is required")]
    MissingFirstName,

    #[error("Last name is required")]
    MissingLastName,

    #[error("Email address is invalid")]
    InvalidEmail,

    #[error("Phone number is invalid")]
    InvalidPhone,

    #[error("Company name is required for business orders")]
    MissingCompany,

    #[error("Payment method is required")]
    MissingPaymentMethod,

    #[error("Card number is invalid")]
    InvalidCardNumber,

    #[error("Card expiry must be MM/YY")]
    InvalidCardExpiry,

    #[error("Card security code is invalid")]
    InvalidCardCvc,

    #[error("Card holder is required")]
    MissingCardHolder,

    #[error("Terms and conditions must be accepted")]
    TermsNotAccepted,
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::MissingOccasion => Field::Occasion,
            ValidationError::MissingServiceType => Field::ServiceType,
            ValidationError::MissingDate | ValidationError::DateTooSoon { .. } => Field::EventDate,
            ValidationError::MissingTime => Field::EventTime,
            ValidationError::TooFewGuests { .. } | ValidationError::BelowMenuMinimum { .. } => {
                Field::GuestCount
            }
            ValidationError::InvalidPostalCode { .. } => Field::PostalCode,
            ValidationError::NoMenuSelected | ValidationError::UnknownMenu { .. } => Field::Menu,
            ValidationError::NotEnoughSelections { .. } => Field::Selections,
            ValidationError::BelowMinimumOrder { .. } => Field::OrderTotal,
            ValidationError::MissingFirstName => Field::FirstName,
            ValidationError::MissingLastName => Field::LastName,
            ValidationError::InvalidEmail => Field::Email,
            ValidationError::InvalidPhone => Field::Phone,
            ValidationError::MissingCompany => Field::Company,
            ValidationError::MissingPaymentMethod => Field::PaymentMethod,
            ValidationError::InvalidCardNumber => Field::CardNumber,
            ValidationError::InvalidCardExpiry => Field::CardExpiry,
            ValidationError::InvalidCardCvc => Field::CardCvc,
            ValidationError::MissingCardHolder => Field::CardHolder,
            ValidationError::TermsNotAccepted => Field::Terms,
        }
    }

    /// Key into the message table.
    pub fn message_key(&self) -> &'static str {
        match self {
            ValidationError::MissingOccasion => "validation.event.occasion_required",
            ValidationError::MissingServiceType => "validation.event.service_type_required",
            ValidationError::MissingDate => "validation.event.date_required",
            ValidationError::DateTooSoon { .. } => "validation.event.date_too_soon",
            ValidationError::MissingTime => "validation.event.time_required",
            ValidationError::TooFewGuests { .. } => "validation.event.guests_too_few",
            ValidationError::InvalidPostalCode { .. } => "validation.event.postal_code_invalid",
            ValidationError::NoMenuSelected => "validation.menu.required",
            ValidationError::UnknownMenu { .. } => "validation.menu.unknown",
            ValidationError::BelowMenuMinimum { .. } => "validation.menu.guests_too_few",
            ValidationError::NotEnoughSelections { .. } => "validation.category.not_enough",
            ValidationError::BelowMinimumOrder { .. } => "validation.order.minimum_not_met",
            ValidationError::MissingFirstName => "validation.contact.first_name_required",
            ValidationError::MissingLastName => "validation.contact.last_name_required",
            ValidationError::InvalidEmail => "validation.contact.email_invalid",
            ValidationError::InvalidPhone => "validation.contact.phone_invalid",
            ValidationError::MissingCompany => "validation.contact.company_required",
            ValidationError::MissingPaymentMethod => "validation.payment.method_required",
            ValidationError::InvalidCardNumber => "validation.payment.card_number_invalid",
            ValidationError::InvalidCardExpiry => "validation.payment.card_expiry_invalid",
            ValidationError::InvalidCardCvc => "validation.payment.card_cvc_invalid",
            ValidationError::MissingCardHolder => "validation.payment.card_holder_required",
            ValidationError::TermsNotAccepted => "validation.terms.required",
        }
    }
}

/// A validation error located at a wizard step.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Step {step}: {error}")]
pub struct StepError {
    /// Wizard index of the failing step.
    pub step: usize,
    pub error: ValidationError,
}

/// Everything step validation reads. Prices the draft once on construction.
#[derive(Debug, Clone)]
pub struct ValidationContext<'a> {
    pub draft: &'a OrderDraft,
    pub catalog: &'a Catalog,
    pub plan: &'a StepPlan,
    pub constraints: &'a SystemConstraints,
    pub policy: &'a PricingPolicy,
    /// Local calendar date the lead time is measured from.
    pub today: NaiveDate,
    breakdown: PriceBreakdown,
}

impl<'a> ValidationContext<'a> {
    pub fn new(
        draft: &'a OrderDraft,
        catalog: &'a Catalog,
        plan: &'a StepPlan,
        constraints: &'a SystemConstraints,
        policy: &'a PricingPolicy,
        today: NaiveDate,
    ) -> Self {
        let menu = draft.menu_id.as_ref().and_then(|id| catalog.menu(id));
        let breakdown = quote(&PricingInput::from_draft(draft, menu, plan), policy);
        Self {
            draft,
            catalog,
            plan,
            constraints,
            policy,
            today,
            breakdown,
        }
    }

    /// The selected menu, if it exists in the catalog.
    pub fn menu(&self) -> Option<&'a Menu> {
        self.draft
            .menu_id
            .as_ref()
            .and_then(|id| self.catalog.menu(id))
    }

    pub fn breakdown(&self) -> &PriceBreakdown {
        &self.breakdown
    }
}

/// Validation result of one step, for progress displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStatus {
    pub index: usize,
    pub step: WizardStep,
    pub error: Option<ValidationError>,
}

/// Validates the step at wizard index `index`.
///
/// An index past the end of the plan is treated as valid.
pub fn validate_step(ctx: &ValidationContext<'_>, index: usize) -> Result<(), StepError> {
    let result = match ctx.plan.step_at(index) {
        Some(WizardStep::EventDetails) => validate_event_details(ctx),
        Some(WizardStep::MenuSelection) => validate_menu_selection(ctx),
        Some(WizardStep::Category(entry)) => validate_category(ctx, entry),
        Some(WizardStep::Accessories) => validate_minimum_order(ctx),
        Some(WizardStep::Checkout) => validate_checkout(ctx),
        None => Ok(()),
    };
    result.map_err(|error| StepError { step: index, error })
}

/// Validates steps `from..to` in order and returns the first failure.
pub fn validate_range(ctx: &ValidationContext<'_>, from: usize, to: usize) -> Result<(), StepError> {
    (from..to).try_for_each(|index| validate_step(ctx, index))
}

/// Validates every step of the plan.
pub fn validate_all(ctx: &ValidationContext<'_>) -> Result<(), StepError> {
    validate_range(ctx, 0, ctx.plan.len())
}

/// Validation status of every step.
pub fn step_statuses(ctx: &ValidationContext<'_>) -> Vec<StepStatus> {
    ctx.plan
        .steps()
        .into_iter()
        .enumerate()
        .map(|(index, step)| StepStatus {
            index,
            step,
            error: validate_step(ctx, index).err().map(|e| e.error),
        })
        .collect()
}

fn validate_event_details(ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
    let event = &ctx.draft.event;

    if event.occasion.as_deref().is_none_or(|o| o.trim().is_empty()) {
        return Err(ValidationError::MissingOccasion);
    }
    if event.service_type.is_none() {
        return Err(ValidationError::MissingServiceType);
    }
    let Some(date) = event.date else {
        return Err(ValidationError::MissingDate);
    };
    if event.time.is_none() {
        return Err(ValidationError::MissingTime);
    }
    if event.guest_count < ctx.policy.min_guests {
        return Err(ValidationError::TooFewGuests {
            minimum: ctx.policy.min_guests,
            actual: event.guest_count,
        });
    }
    let earliest = earliest_event_date(event.guest_count, ctx.today, ctx.policy);
    if date < earliest {
        return Err(ValidationError::DateTooSoon { date, earliest });
    }
    if !is_valid_postal_code(&event.address.postal_code) {
        return Err(ValidationError::InvalidPostalCode {
            postal_code: event.address.postal_code.clone(),
        });
    }
    Ok(())
}

fn validate_menu_selection(ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
    let Some(menu_id) = &ctx.draft.menu_id else {
        return Err(ValidationError::NoMenuSelected);
    };
    let menu = ctx
        .menu()
        .filter(|menu| menu.active)
        .ok_or_else(|| ValidationError::UnknownMenu {
            menu_id: menu_id.clone(),
        })?;
    if ctx.draft.event.guest_count < menu.min_guests {
        return Err(ValidationError::BelowMenuMinimum {
            minimum: menu.min_guests,
            actual: ctx.draft.event.guest_count,
        });
    }
    Ok(())
}

fn validate_category(ctx: &ValidationContext<'_>, entry: usize) -> Result<(), ValidationError> {
    let Some(plan_entry) = ctx.plan.entry(entry) else {
        return Ok(());
    };
    let required = ctx.plan.cumulative_included(entry);
    let selected = ctx.draft.selections.line_item_count(plan_entry.key, ctx.plan) as u32;
    if selected < required {
        return Err(ValidationError::NotEnoughSelections {
            key: plan_entry.key,
            required,
            selected,
        });
    }
    Ok(())
}

fn validate_minimum_order(ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
    if !ctx.breakdown.meets_minimum(ctx.policy) {
        return Err(ValidationError::BelowMinimumOrder {
            minimum: ctx.policy.minimum_order,
            pre_tax_total: ctx.breakdown.pre_tax_total,
        });
    }
    Ok(())
}

fn validate_checkout(ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
    validate_minimum_order(ctx)?;

    let draft = ctx.draft;
    let contact = &draft.contact;
    if contact.first_name.trim().is_empty() {
        return Err(ValidationError::MissingFirstName);
    }
    if contact.last_name.trim().is_empty() {
        return Err(ValidationError::MissingLastName);
    }
    if !EMAIL.is_match(contact.email.trim()) {
        return Err(ValidationError::InvalidEmail);
    }
    if !is_valid_phone(&contact.phone) {
        return Err(ValidationError::InvalidPhone);
    }
    if draft.is_business() && contact.company.trim().is_empty() {
        return Err(ValidationError::MissingCompany);
    }
    let Some(method) = draft.payment_method else {
        return Err(ValidationError::MissingPaymentMethod);
    };
    if method == PaymentMethod::Card {
        validate_card(draft.card.as_ref())?;
    }
    if !draft.terms_accepted {
        return Err(ValidationError::TermsNotAccepted);
    }
    Ok(())
}

/// Structural card check: 13-19 digits, `MM/YY`, 3-4 digit CVC, a holder name.
pub fn validate_card(card: Option<&CardDetails>) -> Result<(), ValidationError> {
    let Some(card) = card else {
        return Err(ValidationError::InvalidCardNumber);
    };

    let digits: String = card
        .number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if !(13..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidCardNumber);
    }
    if !CARD_EXPIRY.is_match(card.expiry.trim()) {
        return Err(ValidationError::InvalidCardExpiry);
    }
    let cvc = card.cvc.trim();
    if !(3..=4).contains(&cvc.len()) || !cvc.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidCardCvc);
    }
    if card.holder.trim().is_empty() {
        return Err(ValidationError::MissingCardHolder);
    }
    Ok(())
}

/// True for exactly five ASCII digits.
pub fn is_valid_postal_code(code: &str) -> bool {
    POSTAL_CODE.is_match(code.trim())
}

fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    PHONE.is_match(phone) && phone.chars().filter(char::is_ascii_digit).count() >= 6
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveTime};

    use super::*;
    use crate::catalog::Product;
    use crate::draft::{CustomerType, ServiceType};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn catalog() -> Catalog {
        Catalog {
            menus: vec![
                Menu::new("spring", "Spring", Money::from_euros(30))
                    .with_step("main", 2)
                    .with_min_guests(15),
            ],
            products: vec![
                Product::new("a", "A", "main", Money::from_cents(1000)),
                Product::new("b", "B", "main", Money::from_cents(1500)),
            ],
            accessories: vec![],
        }
    }

    fn complete_draft() -> OrderDraft {
        let mut draft = OrderDraft::new();
        draft.event.occasion = Some("wedding".to_string());
        draft.event.service_type = Some(ServiceType::Buffet);
        draft.event.date = today().checked_add_days(Days::new(14));
        draft.event.time = NaiveTime::from_hms_opt(18, 0, 0);
        draft.event.guest_count = 20;
        draft.event.address.postal_code = "10115".to_string();
        draft.menu_id = Some(MenuId::new("spring"));
        draft.contact.first_name = "Ada".to_string();
        draft.contact.last_name = "Lovelace".to_string();
        draft.contact.email = "ada@example.com".to_string();
        draft.contact.phone = "+49 30 1234567".to_string();
        draft.payment_method = Some(PaymentMethod::Invoice);
        draft.terms_accepted = true;
        let catalog = catalog();
        for product in &catalog.products {
            draft
                .selections
                .add_or_replace(CategoryKey::Main, product, 1)
                .unwrap();
        }
        draft
    }

    fn check(draft: &OrderDraft, index: usize) -> Result<(), ValidationError> {
        let catalog = catalog();
        let plan = StepPlan::build(draft.menu_id.as_ref().and_then(|id| catalog.menu(id)));
        let constraints = SystemConstraints::default();
        let policy = PricingPolicy::default();
        let ctx = ValidationContext::new(draft, &catalog, &plan, &constraints, &policy, today());
        validate_step(&ctx, index).map_err(|e| e.error)
    }

    #[test]
    fn test_complete_draft_passes_every_step() {
        let draft = complete_draft();
        for index in 0..5 {
            assert_eq!(check(&draft, index), Ok(()), "step {index}");
        }
    }

    #[test]
    fn test_event_details_rules_in_order() {
        let mut draft = complete_draft();
        draft.event.occasion = Some("  ".to_string());
        assert_eq!(check(&draft, 0), Err(ValidationError::MissingOccasion));

        let mut draft = complete_draft();
        draft.event.time = None;
        assert_eq!(check(&draft, 0), Err(ValidationError::MissingTime));

        let mut draft = complete_draft();
        draft.event.guest_count = 9;
        assert_eq!(
            check(&draft, 0),
            Err(ValidationError::TooFewGuests {
                minimum: 10,
                actual: 9
            })
        );

        let mut draft = complete_draft();
        draft.event.address.postal_code = "1011".to_string();
        assert_eq!(check(&draft, 0).unwrap_err().field(), Field::PostalCode);
    }

    #[test]
    fn test_event_date_must_respect_lead_time() {
        let mut draft = complete_draft();
        draft.event.date = today().checked_add_days(Days::new(1));
        assert!(matches!(
            check(&draft, 0),
            Err(ValidationError::DateTooSoon { .. })
        ));
    }

    #[test]
    fn test_menu_step_requires_menu_and_menu_minimum() {
        let mut draft = complete_draft();
        draft.menu_id = None;
        assert_eq!(check(&draft, 1), Err(ValidationError::NoMenuSelected));

        let mut draft = complete_draft();
        draft.menu_id = Some(MenuId::new("autumn"));
        assert!(matches!(
            check(&draft, 1),
            Err(ValidationError::UnknownMenu { .. })
        ));

        let mut draft = complete_draft();
        draft.event.guest_count = 12;
        assert_eq!(
            check(&draft, 1),
            Err(ValidationError::BelowMenuMinimum {
                minimum: 15,
                actual: 12
            })
        );
    }

    #[test]
    fn test_category_step_requires_included_count() {
        let mut draft = complete_draft();
        draft.selections.remove(&"b".into());
        assert_eq!(
            check(&draft, 2),
            Err(ValidationError::NotEnoughSelections {
                key: CategoryKey::Main,
                required: 2,
                selected: 1
            })
        );
    }

    #[test]
    fn test_business_checkout_requires_company() {
        let mut draft = complete_draft();
        draft.customer_type = CustomerType::Business;
        assert_eq!(check(&draft, 4), Err(ValidationError::MissingCompany));

        draft.contact.company = "Analytical Engines Ltd".to_string();
        assert_eq!(check(&draft, 4), Ok(()));
    }

    #[test]
    fn test_checkout_contact_and_terms() {
        let mut draft = complete_draft();
        draft.contact.email = "ada@example".to_string();
        assert_eq!(check(&draft, 4), Err(ValidationError::InvalidEmail));

        let mut draft = complete_draft();
        draft.contact.phone = "12-34".to_string();
        assert_eq!(check(&draft, 4), Err(ValidationError::InvalidPhone));

        let mut draft = complete_draft();
        draft.payment_method = None;
        assert_eq!(check(&draft, 4), Err(ValidationError::MissingPaymentMethod));

        let mut draft = complete_draft();
        draft.terms_accepted = false;
        assert_eq!(check(&draft, 4), Err(ValidationError::TermsNotAccepted));
    }

    #[test]
    fn test_card_structure() {
        let good = CardDetails {
            number: "4111 1111 1111 1111".to_string(),
            expiry: "09/28".to_string(),
            cvc: "123".to_string(),
            holder: "Ada Lovelace".to_string(),
        };
        assert_eq!(validate_card(Some(&good)), Ok(()));
        assert_eq!(validate_card(None), Err(ValidationError::InvalidCardNumber));

        let short = CardDetails {
            number: "4111 1111".to_string(),
            ..good.clone()
        };
        assert_eq!(validate_card(Some(&short)), Err(ValidationError::InvalidCardNumber));

        let bad_month = CardDetails {
            expiry: "13/28".to_string(),
            ..good.clone()
        };
        assert_eq!(validate_card(Some(&bad_month)), Err(ValidationError::InvalidCardExpiry));

        let bad_cvc = CardDetails {
            cvc: "12a".to_string(),
            ..good.clone()
        };
        assert_eq!(validate_card(Some(&bad_cvc)), Err(ValidationError::InvalidCardCvc));

        let no_holder = CardDetails {
            holder: " ".to_string(),
            ..good
        };
        assert_eq!(validate_card(Some(&no_holder)), Err(ValidationError::MissingCardHolder));
    }

    #[test]
    fn test_card_payment_is_checked_at_checkout() {
        let mut draft = complete_draft();
        draft.payment_method = Some(PaymentMethod::Card);
        assert_eq!(check(&draft, 4), Err(ValidationError::InvalidCardNumber));
    }

    #[test]
    fn test_errors_expose_message_keys() {
        assert_eq!(
            ValidationError::TermsNotAccepted.message_key(),
            "validation.terms.required"
        );
        let messages = crate::messages::Messages::english();
        assert!(messages
            .lookup(ValidationError::MissingCompany.message_key())
            .is_some());
    }
}
