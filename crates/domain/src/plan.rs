//! Step plan construction.
//!
//! The wizard always opens with event details and the menu pick and always
//! closes with accessories and checkout. What happens in between is shaped by
//! the selected menu's step definitions:
//!
//! ```text
//! [EventDetails, MenuSelection, Category(0), .., Category(n-1), Accessories, Checkout]
//! ```

use std::collections::BTreeSet;

use common::MenuId;
use serde::{Deserialize, Serialize};

use crate::catalog::Menu;
use crate::category::{CategoryKey, classify};

/// One category step of the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPlanEntry {
    pub key: CategoryKey,
    pub label: String,
    pub included: u32,
}

/// A step of the wizard sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entry", rename_all = "snake_case")]
pub enum WizardStep {
    EventDetails,
    MenuSelection,
    /// Index into [`StepPlan::entries`].
    Category(usize),
    Accessories,
    Checkout,
}

/// Number of fixed steps before the first category step.
const LEADING_STEPS: usize = 2;

/// Number of fixed steps after the last category step.
const TRAILING_STEPS: usize = 2;

/// The derived step layout for one menu (or for no menu at all).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPlan {
    menu_id: Option<MenuId>,
    entries: Vec<StepPlanEntry>,
}

impl StepPlan {
    /// Builds the plan for `menu`.
    ///
    /// Step labels the classifier does not recognize are dropped. When no
    /// usable entry remains, the plan falls back to one entry per core
    /// category with nothing included.
    pub fn build(menu: Option<&Menu>) -> Self {
        let mut entries: Vec<StepPlanEntry> = menu
            .map(|menu| {
                menu.steps
                    .iter()
                    .filter_map(|step| match classify(&step.category) {
                        Some(key) => Some(StepPlanEntry {
                            key,
                            label: step.category.trim().to_string(),
                            included: step.included,
                        }),
                        None => {
                            tracing::debug!(
                                menu_id = %menu.id,
                                label = %step.category,
                                "dropping unrecognized step label"
                            );
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        if entries.is_empty() {
            entries = CategoryKey::CORE
                .iter()
                .map(|key| StepPlanEntry {
                    key: *key,
                    label: key.display_label().to_string(),
                    included: 0,
                })
                .collect();
        }

        Self {
            menu_id: menu.map(|menu| menu.id.clone()),
            entries,
        }
    }

    /// The menu this plan was built for.
    pub fn menu_id(&self) -> Option<&MenuId> {
        self.menu_id.as_ref()
    }

    pub fn entries(&self) -> &[StepPlanEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&StepPlanEntry> {
        self.entries.get(index)
    }

    /// Total number of wizard steps, fixed steps included.
    pub fn len(&self) -> usize {
        LEADING_STEPS + self.entries.len() + TRAILING_STEPS
    }

    /// A plan always has its fixed steps, so it is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The full wizard step sequence.
    pub fn steps(&self) -> Vec<WizardStep> {
        (0..self.len()).filter_map(|index| self.step_at(index)).collect()
    }

    /// Returns the step at a wizard index.
    pub fn step_at(&self, index: usize) -> Option<WizardStep> {
        let categories = self.entries.len();
        match index {
            0 => Some(WizardStep::EventDetails),
            1 => Some(WizardStep::MenuSelection),
            i if i < LEADING_STEPS + categories => Some(WizardStep::Category(i - LEADING_STEPS)),
            i if i == LEADING_STEPS + categories => Some(WizardStep::Accessories),
            i if i == LEADING_STEPS + categories + 1 => Some(WizardStep::Checkout),
            _ => None,
        }
    }

    /// Wizard index of the first category step.
    pub fn first_category_index(&self) -> usize {
        LEADING_STEPS
    }

    /// Wizard index of the checkout step.
    pub fn checkout_index(&self) -> usize {
        self.len() - 1
    }

    /// Clamps a cursor into the bounds of this plan.
    pub fn clamp_cursor(&self, cursor: usize) -> usize {
        cursor.min(self.len() - 1)
    }

    /// Sum of `included` over every entry sharing `key`.
    pub fn included_for(&self, key: CategoryKey) -> u32 {
        self.entries
            .iter()
            .filter(|entry| entry.key == key)
            .fold(0u32, |total, entry| total.saturating_add(entry.included))
    }

    /// Running sum of `included` for the entry's key, up to and including the
    /// entry at `entry_index`.
    pub fn cumulative_included(&self, entry_index: usize) -> u32 {
        let Some(target) = self.entries.get(entry_index) else {
            return 0;
        };
        self.entries[..=entry_index]
            .iter()
            .filter(|entry| entry.key == target.key)
            .fold(0u32, |total, entry| total.saturating_add(entry.included))
    }

    /// Distinct keys in step order.
    pub fn active_keys(&self) -> Vec<CategoryKey> {
        let mut seen = BTreeSet::new();
        self.entries
            .iter()
            .filter(|entry| seen.insert(entry.key))
            .map(|entry| entry.key)
            .collect()
    }

    pub fn is_active(&self, key: CategoryKey) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }

    /// Tag keys claimed by some entry of this plan.
    pub fn claimed_tags(&self) -> BTreeSet<CategoryKey> {
        self.entries
            .iter()
            .map(|entry| entry.key)
            .filter(CategoryKey::is_tag)
            .collect()
    }
}

impl Default for StepPlan {
    fn default() -> Self {
        Self::build(None)
    }
}

#[cfg(test)]
mod tests {
    use common::Money;

    use super::*;

    fn spring() -> Menu {
        Menu::new("spring", "Spring", Money::from_euros(25))
            .with_step("Starters", 1)
            .with_step("Mains", 2)
            .with_step("cutlery", 4)
            .with_step("main", 1)
            .with_step("Desserts", 1)
    }

    #[test]
    fn test_build_drops_unrecognized_labels() {
        let plan = StepPlan::build(Some(&spring()));
        let keys: Vec<_> = plan.entries().iter().map(|e| e.key).collect();
        assert_eq!(
            keys,
            vec![
                CategoryKey::Starter,
                CategoryKey::Main,
                CategoryKey::Main,
                CategoryKey::Dessert
            ]
        );
        assert_eq!(plan.menu_id(), Some(&MenuId::new("spring")));
    }

    #[test]
    fn test_build_falls_back_to_core_categories() {
        let empty = Menu::new("bare", "Bare", Money::from_euros(10)).with_step("napkins", 3);
        for plan in [StepPlan::build(Some(&empty)), StepPlan::build(None)] {
            let keys: Vec<_> = plan.entries().iter().map(|e| e.key).collect();
            assert_eq!(keys, CategoryKey::CORE.to_vec());
            assert!(plan.entries().iter().all(|e| e.included == 0));
        }
    }

    #[test]
    fn test_step_sequence_wraps_entries_with_fixed_steps() {
        let plan = StepPlan::build(Some(&spring()));
        assert_eq!(plan.len(), 8);
        assert_eq!(
            plan.steps(),
            vec![
                WizardStep::EventDetails,
                WizardStep::MenuSelection,
                WizardStep::Category(0),
                WizardStep::Category(1),
                WizardStep::Category(2),
                WizardStep::Category(3),
                WizardStep::Accessories,
                WizardStep::Checkout,
            ]
        );
        assert_eq!(plan.step_at(8), None);
        assert_eq!(plan.checkout_index(), 7);
        assert_eq!(plan.first_category_index(), 2);
    }

    #[test]
    fn test_included_totals_and_cumulative_counts() {
        let plan = StepPlan::build(Some(&spring()));
        assert_eq!(plan.included_for(CategoryKey::Main), 3);
        assert_eq!(plan.included_for(CategoryKey::Beverage), 0);

        assert_eq!(plan.cumulative_included(0), 1);
        assert_eq!(plan.cumulative_included(1), 2);
        assert_eq!(plan.cumulative_included(2), 3);
        assert_eq!(plan.cumulative_included(3), 1);
        assert_eq!(plan.cumulative_included(99), 0);
    }

    #[test]
    fn test_active_keys_are_distinct_in_step_order() {
        let plan = StepPlan::build(Some(&spring()));
        assert_eq!(
            plan.active_keys(),
            vec![CategoryKey::Starter, CategoryKey::Main, CategoryKey::Dessert]
        );
    }

    #[test]
    fn test_claimed_tags() {
        let menu = Menu::new("veg", "Veg", Money::from_euros(30))
            .with_step("main", 2)
            .with_step("Vegetarian", 1);
        let plan = StepPlan::build(Some(&menu));
        assert_eq!(
            plan.claimed_tags().into_iter().collect::<Vec<_>>(),
            vec![CategoryKey::Vegetarian]
        );
    }

    #[test]
    fn test_rebuild_is_idempotent_and_clamps_cursor() {
        let long = StepPlan::build(Some(&spring()));
        let again = StepPlan::build(Some(&spring()));
        assert_eq!(long, again);

        let short = StepPlan::build(Some(
            &Menu::new("tiny", "Tiny", Money::from_euros(5)).with_step("drinks", 1),
        ));
        assert_eq!(short.len(), 5);
        assert_eq!(short.clamp_cursor(7), 4);
        assert_eq!(short.clamp_cursor(3), 3);
    }
}
