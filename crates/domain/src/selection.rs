//! Per-category dish selections.

use std::collections::BTreeMap;

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Product;
use crate::category::CategoryKey;
use crate::plan::StepPlan;

/// Errors that can occur when editing selections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Zero quantities are not added; use remove instead.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// The product does not belong to the category of the step it was picked in.
    #[error("Product {product_id} is not eligible for category {key}")]
    NotEligible {
        product_id: ProductId,
        key: CategoryKey,
    },

    /// The product's primary category label is not one of the core categories.
    #[error("Product {product_id} has no recognized core category ({label:?})")]
    UnknownCategory { product_id: ProductId, label: String },

    #[error("Product {product_id} is not available")]
    Unavailable { product_id: ProductId },
}

/// A chosen product with its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub product: Product,
    pub quantity: u32,
}

impl Selection {
    pub fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    pub fn unit_price(&self) -> Money {
        self.product.unit_price
    }

    /// Unit price times quantity.
    pub fn line_total(&self) -> Money {
        self.product.unit_price.multiply(self.quantity)
    }
}

/// Outcome of [`SelectionStore::set_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The selection now has this quantity.
    Set(u32),
    /// The quantity fell below the product minimum and the selection was dropped.
    Removed,
}

/// Selections grouped into the five core-category buckets.
///
/// Each bucket keeps selection order. A product lives in the bucket of its
/// primary category and appears at most once there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionStore {
    buckets: BTreeMap<CategoryKey, Vec<Selection>>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product or replaces its existing selection.
    ///
    /// Quantities below the product minimum are raised to the minimum. An
    /// existing selection keeps its position.
    pub fn add_or_replace(
        &mut self,
        key: CategoryKey,
        product: &Product,
        quantity: u32,
    ) -> Result<&Selection, SelectionError> {
        if quantity == 0 {
            return Err(SelectionError::InvalidQuantity { quantity });
        }
        let bucket = Self::owning_bucket(key, product)?;
        if !product.available {
            return Err(SelectionError::Unavailable {
                product_id: product.id.clone(),
            });
        }

        let selection = Selection {
            product: product.clone(),
            quantity: quantity.max(product.minimum()),
        };

        let items = self.buckets.entry(bucket).or_default();
        let index = match items.iter().position(|s| s.product.id == product.id) {
            Some(index) => {
                items[index] = selection;
                index
            }
            None => {
                items.push(selection);
                items.len() - 1
            }
        };
        Ok(&items[index])
    }

    /// Sets the quantity of a product.
    ///
    /// A quantity below the product minimum (zero included) removes the
    /// selection entirely; nothing below the minimum is ever stored.
    pub fn set_quantity(
        &mut self,
        key: CategoryKey,
        product: &Product,
        quantity: u32,
    ) -> Result<QuantityChange, SelectionError> {
        if quantity < product.minimum() {
            self.remove(&product.id);
            return Ok(QuantityChange::Removed);
        }
        let selection = self.add_or_replace(key, product, quantity)?;
        Ok(QuantityChange::Set(selection.quantity))
    }

    /// Removes the selection for a product, wherever it lives.
    pub fn remove(&mut self, product_id: &ProductId) -> Option<Selection> {
        for items in self.buckets.values_mut() {
            if let Some(index) = items.iter().position(|s| &s.product.id == product_id) {
                return Some(items.remove(index));
            }
        }
        None
    }

    pub fn get(&self, product_id: &ProductId) -> Option<&Selection> {
        self.iter().find(|s| &s.product.id == product_id)
    }

    /// Selections of one core bucket, in selection order.
    pub fn bucket(&self, core: CategoryKey) -> &[Selection] {
        self.buckets.get(&core).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All selections, bucket by bucket in core order.
    pub fn iter(&self) -> impl Iterator<Item = &Selection> {
        CategoryKey::CORE
            .into_iter()
            .flat_map(move |core| self.bucket(core).iter())
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Selections that count toward `key` under `plan`.
    ///
    /// For a core key: every selection whose primary category is `key`,
    /// except those carrying a tag some plan entry claims (those count toward
    /// the tag step instead). For a tag key: every selection carrying the tag,
    /// unless an earlier step claims another of its tags. Each selection
    /// counts toward at most one key of the plan.
    pub fn items_matching(&self, key: CategoryKey, plan: &StepPlan) -> Vec<&Selection> {
        let claimed = claimed_in_step_order(plan);
        self.iter()
            .filter(|s| counts_toward(&s.product, key, &claimed))
            .collect()
    }

    /// Number of distinct line items counting toward `key`.
    pub fn line_item_count(&self, key: CategoryKey, plan: &StepPlan) -> usize {
        self.items_matching(key, plan).len()
    }

    /// Keeps only the selections for which `keep` returns true; returns the rest.
    pub fn retain(&mut self, mut keep: impl FnMut(&Selection) -> bool) -> Vec<Selection> {
        let mut dropped = Vec::new();
        for items in self.buckets.values_mut() {
            let (kept, removed): (Vec<_>, Vec<_>) = items.drain(..).partition(|s| keep(s));
            *items = kept;
            dropped.extend(removed);
        }
        dropped
    }

    /// Drops selections that no longer count toward any step of `plan`.
    pub fn retain_for_plan(&mut self, plan: &StepPlan) -> Vec<Selection> {
        let keys = plan.active_keys();
        let claimed = claimed_in_step_order(plan);
        self.retain(|s| {
            keys.iter()
                .any(|key| counts_toward(&s.product, *key, &claimed))
        })
    }

    fn owning_bucket(key: CategoryKey, product: &Product) -> Result<CategoryKey, SelectionError> {
        let bucket = product
            .primary_category()
            .ok_or_else(|| SelectionError::UnknownCategory {
                product_id: product.id.clone(),
                label: product.category.clone(),
            })?;
        if !product.belongs_to(key) {
            return Err(SelectionError::NotEligible {
                product_id: product.id.clone(),
                key,
            });
        }
        Ok(bucket)
    }
}

/// Tag keys the plan has a step for, first step first.
fn claimed_in_step_order(plan: &StepPlan) -> Vec<CategoryKey> {
    plan.active_keys()
        .into_iter()
        .filter(CategoryKey::is_tag)
        .collect()
}

fn counts_toward(product: &Product, key: CategoryKey, claimed: &[CategoryKey]) -> bool {
    let owner = claimed.iter().find(|tag| product.has_tag(**tag));
    if key.is_core() {
        product.primary_category() == Some(key) && owner.is_none()
    } else {
        match owner {
            Some(owner) => *owner == key,
            None => product.has_tag(key),
        }
    }
}
