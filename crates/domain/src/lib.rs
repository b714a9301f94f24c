//! Order configuration and pricing engine for the catering storefront.
//!
//! This crate is pure and synchronous. It provides:
//! - Category classification of free-text catalog labels
//! - The step plan derived from the selected menu
//! - The selection store and the included-vs-extra allocator
//! - Pricing with service fee, VAT and the minimum-order rule
//! - Per-step validation and the navigation guard
//! - Lead-time rules for the event date
//! - Assembly of the final order payload

pub mod catalog;
pub mod category;
pub mod draft;
pub mod error;
pub mod inclusion;
pub mod messages;
pub mod navigation;
pub mod plan;
pub mod policy;
pub mod pricing;
pub mod schedule;
pub mod selection;
pub mod submission;
pub mod validation;

pub use catalog::{
    Accessory, Catalog, ClosedDate, Menu, PauseStatus, Product, StepDefinition, SystemConstraints,
};
pub use category::{CategoryKey, UnknownCategory, classify, classify_core};
pub use common::{AccessoryId, MenuId, Money, OrderId, ProductId};
pub use draft::{
    AccessorySelection, Address, CardDetails, ContactInfo, CustomerType, EventDetails, OrderDraft,
    PaymentMethod, ServiceType,
};
pub use error::DomainError;
pub use inclusion::{AllocatedLine, CategoryAllocation, allocate};
pub use messages::Messages;
pub use navigation::{BlockReason, NavigationOutcome, check_blocking, navigate};
pub use plan::{StepPlan, StepPlanEntry, WizardStep};
pub use policy::PricingPolicy;
pub use pricing::{PriceBreakdown, PricingInput, quote, vat_rate_bps};
pub use schedule::{GuestCountChange, ScheduleError, apply_guest_count, earliest_event_date};
pub use selection::{QuantityChange, Selection, SelectionError, SelectionStore};
pub use submission::{
    OrderPayload, PayloadAccessory, PayloadContact, PayloadEvent, PayloadItem, SubmissionError,
    assemble,
};
pub use validation::{
    Field, StepError, StepStatus, ValidationContext, ValidationError, step_statuses,
    validate_all, validate_step,
};
