//! Navigation guard over the wizard steps.
//!
//! Moving backwards is always allowed. Moving forwards first checks the
//! external blocking conditions, then validates every step between the cursor
//! and the target in order:
//!
//! ```text
//!   target <= current ──────────────────────────────► Moved(target)
//!   paused ─────────────────────────────────────────► Blocked (cursor stays)
//!   closed date && current >= first category step ──► Blocked (cursor stays)
//!   first invalid step in current..target ──────────► Rejected (cursor snaps to it)
//!   otherwise ──────────────────────────────────────► Moved(target)
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::{StepError, ValidationContext, validate_range};

/// A condition outside the draft that blocks progress.
///
/// Distinct from validation errors: shown as a banner, not at a field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum BlockReason {
    #[error("Ordering is paused{}", reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    OrderingPaused { reason: Option<String> },

    #[error("Closed on {date}{}", reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    DateClosed {
        date: NaiveDate,
        reason: Option<String>,
    },
}

impl BlockReason {
    pub fn message_key(&self) -> &'static str {
        match self {
            BlockReason::OrderingPaused { .. } => "blocked.ordering_paused",
            BlockReason::DateClosed { .. } => "blocked.date_closed",
        }
    }
}

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    /// The cursor moved to `to`.
    Moved { to: usize },

    /// A blocking condition stopped forward progress; the cursor stays at `at`.
    Blocked { at: usize, reason: BlockReason },

    /// A step failed validation; the cursor snaps to the failing step.
    Rejected { at: usize, error: StepError },
}

impl NavigationOutcome {
    /// Cursor position after the request.
    pub fn cursor(&self) -> usize {
        match self {
            NavigationOutcome::Moved { to } => *to,
            NavigationOutcome::Blocked { at, .. } | NavigationOutcome::Rejected { at, .. } => *at,
        }
    }

    pub fn is_moved(&self) -> bool {
        matches!(self, NavigationOutcome::Moved { .. })
    }
}

/// Blocking condition for forward progress from `cursor`, if any.
///
/// Paused ordering blocks everywhere. A closed event date blocks only once
/// the cursor reaches the first category step, so the date can still be
/// changed on the earlier steps.
pub fn check_blocking(ctx: &ValidationContext<'_>, cursor: usize) -> Option<BlockReason> {
    if ctx.constraints.pause.paused {
        return Some(BlockReason::OrderingPaused {
            reason: ctx.constraints.pause.reason.clone(),
        });
    }

    if cursor >= ctx.plan.first_category_index() {
        let closure = ctx
            .draft
            .event
            .date
            .and_then(|date| ctx.constraints.closure_on(date));
        if let Some(closed) = closure {
            return Some(BlockReason::DateClosed {
                date: closed.date,
                reason: closed.reason.clone(),
            });
        }
    }

    None
}

/// Decides a move from `current` to `target`.
///
/// Steps before `current` were validated on the forward move that passed
/// them and are not re-checked here; submission re-validates everything.
pub fn navigate(ctx: &ValidationContext<'_>, current: usize, target: usize) -> NavigationOutcome {
    let current = ctx.plan.clamp_cursor(current);
    let target = ctx.plan.clamp_cursor(target);

    if target <= current {
        return NavigationOutcome::Moved { to: target };
    }

    // A jump passes every step before the target, so it is blocked wherever
    // a single step from `target - 1` would be.
    if let Some(reason) = check_blocking(ctx, target - 1) {
        tracing::info!(current, target, reason = %reason, "forward navigation blocked");
        return NavigationOutcome::Blocked {
            at: current,
            reason,
        };
    }

    match validate_range(ctx, current, target) {
        Ok(()) => NavigationOutcome::Moved { to: target },
        Err(error) => {
            tracing::debug!(current, target, failed = error.step, "forward navigation rejected");
            NavigationOutcome::Rejected {
                at: error.step,
                error,
            }
        }
    }
}

/// Moves one step forward.
pub fn next(ctx: &ValidationContext<'_>, current: usize) -> NavigationOutcome {
    navigate(ctx, current, current.saturating_add(1))
}

/// Moves one step back.
pub fn back(ctx: &ValidationContext<'_>, current: usize) -> NavigationOutcome {
    navigate(ctx, current, current.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveTime};
    use common::{MenuId, Money};

    use super::*;
    use crate::catalog::{Catalog, ClosedDate, Menu, Product, SystemConstraints};
    use crate::category::CategoryKey;
    use crate::draft::{OrderDraft, ServiceType};
    use crate::plan::StepPlan;
    use crate::policy::PricingPolicy;
    use crate::validation::ValidationError;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn event_date() -> NaiveDate {
        today().checked_add_days(Days::new(10)).unwrap()
    }

    fn catalog() -> Catalog {
        Catalog {
            menus: vec![
                Menu::new("feast", "Feast", Money::from_euros(40))
                    .with_step("starters", 1)
                    .with_step("mains", 1)
                    .with_step("desserts", 1),
            ],
            products: vec![
                Product::new("s", "Soup", "starter", Money::from_cents(600)),
                Product::new("m", "Roast", "main", Money::from_cents(1800)),
                Product::new("d", "Tart", "dessert", Money::from_cents(700)),
            ],
            accessories: vec![],
        }
    }

    fn draft() -> OrderDraft {
        let mut draft = OrderDraft::new();
        draft.event.occasion = Some("birthday".to_string());
        draft.event.service_type = Some(ServiceType::DropOff);
        draft.event.date = Some(event_date());
        draft.event.time = NaiveTime::from_hms_opt(12, 30, 0);
        draft.event.guest_count = 25;
        draft.event.address.postal_code = "80331".to_string();
        draft.menu_id = Some(MenuId::new("feast"));
        let catalog = catalog();
        for (key, id) in [(CategoryKey::Starter, "s"), (CategoryKey::Main, "m")] {
            let product = catalog.product(&id.into()).unwrap();
            draft.selections.add_or_replace(key, product, 1).unwrap();
        }
        draft
    }

    fn run(
        draft: &OrderDraft,
        constraints: &SystemConstraints,
        current: usize,
        target: usize,
    ) -> NavigationOutcome {
        let catalog = catalog();
        let plan = StepPlan::build(catalog.menu(&MenuId::new("feast")));
        let policy = PricingPolicy::default();
        let ctx = ValidationContext::new(draft, &catalog, &plan, constraints, &policy, today());
        navigate(&ctx, current, target)
    }

    #[test]
    fn test_backward_is_always_allowed() {
        let mut empty = OrderDraft::new();
        empty.menu_id = Some(MenuId::new("feast"));
        let outcome = run(&empty, &SystemConstraints::paused(None), 4, 1);
        assert_eq!(outcome, NavigationOutcome::Moved { to: 1 });
    }

    #[test]
    fn test_forward_validates_interposed_steps() {
        // Steps: 0 event, 1 menu, 2 starters, 3 mains, 4 desserts, 5 accessories, 6 checkout.
        let outcome = run(&draft(), &SystemConstraints::default(), 0, 4);
        assert_eq!(outcome, NavigationOutcome::Moved { to: 4 });
    }

    #[test]
    fn test_skipping_an_invalid_step_reports_that_step() {
        // Desserts (step 4) has nothing selected; jumping from 3 to 5 must fail at 4
        // even though the accessories step itself would validate.
        let outcome = run(&draft(), &SystemConstraints::default(), 3, 5);
        match outcome {
            NavigationOutcome::Rejected { at, error } => {
                assert_eq!(at, 4);
                assert_eq!(error.step, 4);
                assert!(matches!(
                    error.error,
                    ValidationError::NotEnoughSelections {
                        key: CategoryKey::Dessert,
                        ..
                    }
                ));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_rejection_snaps_cursor_to_failing_step() {
        let mut draft = draft();
        draft.selections.remove(&"m".into());
        let outcome = run(&draft, &SystemConstraints::default(), 1, 6);
        assert_eq!(outcome.cursor(), 3);
    }

    #[test]
    fn test_paused_blocks_forward_and_keeps_cursor() {
        let constraints = SystemConstraints::paused(Some("Kitchen renovation".to_string()));
        let outcome = run(&draft(), &constraints, 0, 1);
        assert_eq!(
            outcome,
            NavigationOutcome::Blocked {
                at: 0,
                reason: BlockReason::OrderingPaused {
                    reason: Some("Kitchen renovation".to_string())
                }
            }
        );
    }

    #[test]
    fn test_closed_date_blocks_only_from_first_category_step() {
        let constraints = SystemConstraints {
            closed_dates: vec![ClosedDate {
                date: event_date(),
                reason: None,
            }],
            ..Default::default()
        };

        assert!(run(&draft(), &constraints, 0, 1).is_moved());
        assert!(run(&draft(), &constraints, 1, 2).is_moved());
        assert!(matches!(
            run(&draft(), &constraints, 2, 3),
            NavigationOutcome::Blocked {
                at: 2,
                reason: BlockReason::DateClosed { .. }
            }
        ));

        // Jumping from the menu step straight to checkout passes the category steps.
        assert!(run(&draft(), &constraints, 0, 2).is_moved());
        assert!(matches!(
            run(&draft(), &constraints, 1, 6),
            NavigationOutcome::Blocked {
                at: 1,
                reason: BlockReason::DateClosed { .. }
            }
        ));
        assert!(matches!(
            run(&draft(), &constraints, 0, 3),
            NavigationOutcome::Blocked { at: 0, .. }
        ));
    }

    #[test]
    fn test_target_is_clamped_to_last_step() {
        let mut draft = draft();
        let catalog = catalog();
        draft
            .selections
            .add_or_replace(CategoryKey::Dessert, catalog.product(&"d".into()).unwrap(), 1)
            .unwrap();
        // 25 × €40 + €50 = €1050 pre-tax, checkout contact fields still empty.
        let outcome = run(&draft, &SystemConstraints::default(), 0, 99);
        assert_eq!(outcome, NavigationOutcome::Moved { to: 6 });
    }

    #[test]
    fn test_block_reason_display_and_keys() {
        let reason = BlockReason::OrderingPaused {
            reason: Some("Holidays".to_string()),
        };
        assert_eq!(reason.to_string(), "Ordering is paused: Holidays");
        assert_eq!(reason.message_key(), "blocked.ordering_paused");
    }
}
