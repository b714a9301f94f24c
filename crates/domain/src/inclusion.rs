//! Included-vs-extra allocation per category.
//!
//! A menu includes N *different* dishes per category regardless of how many
//! portions of each are ordered. Past N distinct dishes, the remaining line
//! items are billed in full. Slots go to the cheapest dishes first:
//!
//! 1. sort matched line items by unit price, ascending, keeping selection
//!    order for equal prices;
//! 2. each of the first `included` line items is free, whatever its quantity;
//! 3. every later line item costs `unit_price × quantity`.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::category::CategoryKey;
use crate::selection::Selection;

/// Allocation outcome for one line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatedLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    /// True if the line consumed an included slot.
    pub included: bool,
    /// Amount billed for this line (zero when included).
    pub cost: Money,
}

/// Allocation outcome for one category key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAllocation {
    pub key: CategoryKey,
    /// Included dish count granted by the plan for this key.
    pub included: u32,
    /// Lines in allocation order (cheapest first).
    pub lines: Vec<AllocatedLine>,
    /// Number of selected line items beyond the included count.
    pub extra_count: u32,
    /// Sum of the billed line costs.
    pub extra_cost: Money,
}

impl CategoryAllocation {
    /// Number of distinct line items matched to this key.
    pub fn line_item_count(&self) -> usize {
        self.lines.len()
    }
}

/// Splits `items` into included and billed lines for `key`.
pub fn allocate(key: CategoryKey, included: u32, items: &[&Selection]) -> CategoryAllocation {
    let mut sorted: Vec<&Selection> = items.to_vec();
    // `sort_by_key` is stable, so equal prices keep selection order.
    sorted.sort_by_key(|s| s.unit_price());

    let mut remaining = included;
    let mut extra_cost = Money::zero();
    let lines: Vec<AllocatedLine> = sorted
        .into_iter()
        .map(|s| {
            let free = remaining > 0;
            let cost = if free {
                remaining -= 1;
                Money::zero()
            } else {
                s.line_total()
            };
            extra_cost += cost;
            AllocatedLine {
                product_id: s.product.id.clone(),
                name: s.product.name.clone(),
                quantity: s.quantity,
                unit_price: s.unit_price(),
                included: free,
                cost,
            }
        })
        .collect();

    let extra_count = (lines.len() as u32).saturating_sub(included);

    CategoryAllocation {
        key,
        included,
        lines,
        extra_count,
        extra_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;

    fn selection(id: &str, cents: i64, quantity: u32) -> Selection {
        Selection {
            product: Product::new(id, id, "main", Money::from_cents(cents)),
            quantity,
        }
    }

    fn allocate_owned(included: u32, items: &[Selection]) -> CategoryAllocation {
        let refs: Vec<&Selection> = items.iter().collect();
        allocate(CategoryKey::Main, included, &refs)
    }

    #[test]
    fn test_cheapest_lines_are_included_first() {
        let items = [
            selection("c", 2000, 1),
            selection("a", 1000, 1),
            selection("b", 1500, 1),
        ];
        let allocation = allocate_owned(2, &items);

        let order: Vec<_> = allocation.lines.iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert!(allocation.lines[0].included);
        assert!(allocation.lines[1].included);
        assert!(!allocation.lines[2].included);
        assert_eq!(allocation.extra_cost, Money::from_cents(2000));
        assert_eq!(allocation.extra_count, 1);
    }

    #[test]
    fn test_included_slot_covers_whole_quantity() {
        let items = [selection("cheap", 500, 50), selection("dear", 900, 1)];
        let allocation = allocate_owned(1, &items);

        assert_eq!(allocation.lines[0].cost, Money::zero());
        assert_eq!(allocation.lines[1].cost, Money::from_cents(900));
        assert_eq!(allocation.extra_cost, Money::from_cents(900));
    }

    #[test]
    fn test_billed_lines_charge_full_quantity() {
        let items = [selection("a", 1000, 1), selection("b", 1200, 7)];
        let allocation = allocate_owned(1, &items);
        assert_eq!(allocation.extra_cost, Money::from_cents(8400));
    }

    #[test]
    fn test_equal_prices_keep_selection_order() {
        let items = [
            selection("first", 1000, 3),
            selection("second", 1000, 1),
            selection("third", 1000, 2),
        ];
        let allocation = allocate_owned(1, &items);

        let order: Vec<_> = allocation.lines.iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
        assert_eq!(allocation.extra_cost, Money::from_cents(3000));
    }

    #[test]
    fn test_unused_slots_do_not_go_negative() {
        let items = [selection("a", 1000, 1)];
        let allocation = allocate_owned(3, &items);
        assert_eq!(allocation.extra_count, 0);
        assert_eq!(allocation.extra_cost, Money::zero());
    }

    #[test]
    fn test_nothing_included_bills_everything() {
        let items = [selection("a", 1000, 2), selection("b", 300, 1)];
        let allocation = allocate_owned(0, &items);
        assert_eq!(allocation.extra_count, 2);
        assert_eq!(allocation.extra_cost, Money::from_cents(2300));
        assert_eq!(allocation.line_item_count(), 2);
    }

    #[test]
    fn test_empty_selection() {
        let allocation = allocate_owned(2, &[]);
        assert!(allocation.lines.is_empty());
        assert_eq!(allocation.extra_count, 0);
    }
}
