//! Catalog records supplied by the catalog collaborator.
//!
//! These are already-deserialized values. Shape anomalies degrade instead of
//! failing: a missing price deserializes to zero, a missing minimum quantity
//! to one, and labels the classifier does not recognize are ignored.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use common::{AccessoryId, MenuId, Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::category::{CategoryKey, classify, classify_core};
use crate::error::DomainError;

fn default_min_quantity() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// One step a menu dedicates to a food category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Free-text category label, normalized by the classifier.
    pub category: String,

    /// Number of distinct dishes included in the menu price for this step.
    #[serde(default)]
    pub included: u32,
}

impl StepDefinition {
    pub fn new(category: impl Into<String>, included: u32) -> Self {
        Self {
            category: category.into(),
            included,
        }
    }
}

/// A catering menu with its per-guest base price and step layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub id: MenuId,
    pub name: String,
    #[serde(default)]
    pub description: String,

    /// Base price charged per guest.
    #[serde(default)]
    pub price_per_guest: Money,

    #[serde(default)]
    pub min_guests: u32,

    /// Ordered step definitions driving the category steps of the wizard.
    #[serde(default)]
    pub steps: Vec<StepDefinition>,

    /// Products selectable under this menu. Empty means every product.
    #[serde(default)]
    pub product_ids: Vec<ProductId>,

    #[serde(default = "default_true")]
    pub active: bool,
}

impl Menu {
    /// Creates an active menu without steps or product restrictions.
    pub fn new(id: impl Into<MenuId>, name: impl Into<String>, price_per_guest: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price_per_guest,
            min_guests: 0,
            steps: Vec::new(),
            product_ids: Vec::new(),
            active: true,
        }
    }

    /// Appends a step definition.
    pub fn with_step(mut self, category: impl Into<String>, included: u32) -> Self {
        self.steps.push(StepDefinition::new(category, included));
        self
    }

    pub fn with_min_guests(mut self, min_guests: u32) -> Self {
        self.min_guests = min_guests;
        self
    }

    pub fn with_products(mut self, ids: impl IntoIterator<Item = impl Into<ProductId>>) -> Self {
        self.product_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true if the product may be selected under this menu.
    pub fn offers(&self, product_id: &ProductId) -> bool {
        self.product_ids.is_empty() || self.product_ids.contains(product_id)
    }
}

/// A dish or drink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub unit_price: Money,

    /// Primary category label (starter, main, side, dessert or beverage).
    pub category: String,

    /// Additional free-form tags, e.g. "vegetarian" or "chef-special".
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default = "default_min_quantity")]
    pub min_quantity: u32,

    #[serde(default = "default_true")]
    pub available: bool,

    #[serde(default)]
    pub allergens: Vec<String>,
}

impl Product {
    /// Creates an available product with a minimum quantity of one.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        category: impl Into<String>,
        unit_price: Money,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            unit_price,
            category: category.into(),
            tags: Vec::new(),
            min_quantity: 1,
            available: true,
            allergens: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_min_quantity(mut self, min_quantity: u32) -> Self {
        self.min_quantity = min_quantity;
        self
    }

    /// Returns the classified core category, if the label is recognized.
    pub fn primary_category(&self) -> Option<CategoryKey> {
        classify_core(&self.category)
    }

    /// Returns the classified tag categories this product carries.
    ///
    /// A tag that classifies to a core key is ignored; core membership comes
    /// from the primary category only.
    pub fn tag_keys(&self) -> BTreeSet<CategoryKey> {
        self.tags
            .iter()
            .filter_map(|tag| classify(tag))
            .filter(CategoryKey::is_tag)
            .collect()
    }

    pub fn has_tag(&self, key: CategoryKey) -> bool {
        key.is_tag() && self.tags.iter().any(|tag| classify(tag) == Some(key))
    }

    /// Returns true if the product belongs to `key`: its primary category for
    /// a core key, or one of its tags for a tag key.
    pub fn belongs_to(&self, key: CategoryKey) -> bool {
        if key.is_core() {
            self.primary_category() == Some(key)
        } else {
            self.has_tag(key)
        }
    }

    /// Minimum order quantity, never below one.
    pub fn minimum(&self) -> u32 {
        self.min_quantity.max(1)
    }
}

/// An accessory (tableware, linen, service staff) charged per guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessory {
    pub id: AccessoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,

    /// Price per unit and guest.
    #[serde(default)]
    pub price: Money,

    #[serde(default = "default_min_quantity")]
    pub min_quantity: u32,
}

impl Accessory {
    pub fn new(id: impl Into<AccessoryId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            min_quantity: 1,
        }
    }

    pub fn with_min_quantity(mut self, min_quantity: u32) -> Self {
        self.min_quantity = min_quantity;
        self
    }

    pub fn minimum(&self) -> u32 {
        self.min_quantity.max(1)
    }
}

/// In-memory snapshot of everything the catalog collaborator supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub menus: Vec<Menu>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub accessories: Vec<Accessory>,
}

impl Catalog {
    /// Parses a catalog document.
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn menu(&self, id: &MenuId) -> Option<&Menu> {
        self.menus.iter().find(|menu| &menu.id == id)
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    pub fn accessory(&self, id: &AccessoryId) -> Option<&Accessory> {
        self.accessories.iter().find(|accessory| &accessory.id == id)
    }

    pub fn require_menu(&self, id: &MenuId) -> Result<&Menu, DomainError> {
        self.menu(id).ok_or_else(|| DomainError::NotFound {
            entity: "menu",
            id: id.to_string(),
        })
    }

    /// Returns the available products offered by `menu` that belong to `key`.
    pub fn products_for<'a>(
        &'a self,
        menu: &'a Menu,
        key: CategoryKey,
    ) -> impl Iterator<Item = &'a Product> + 'a {
        self.products
            .iter()
            .filter(move |p| p.available && menu.offers(&p.id) && p.belongs_to(key))
    }
}

/// Ordering-paused flag reported by the system status collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseStatus {
    pub paused: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// A calendar date on which no events are catered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedDate {
    pub date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
}

/// External constraints that block progress independently of step validity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConstraints {
    #[serde(default)]
    pub pause: PauseStatus,
    #[serde(default)]
    pub closed_dates: Vec<ClosedDate>,
}

impl SystemConstraints {
    pub fn paused(reason: Option<String>) -> Self {
        Self {
            pause: PauseStatus {
                paused: true,
                reason,
            },
            closed_dates: Vec::new(),
        }
    }

    /// Returns the closed-date entry for `date`, if any.
    pub fn closure_on(&self, date: NaiveDate) -> Option<&ClosedDate> {
        self.closed_dates.iter().find(|closed| closed.date == date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_categories_are_classified() {
        let product = Product::new("p1", "Halloumi skewers", "Mains", Money::from_cents(900))
            .with_tags(["Veggie", "chef's special", "unknown-tag", "drinks"]);

        assert_eq!(product.primary_category(), Some(CategoryKey::Main));
        let tags: Vec<_> = product.tag_keys().into_iter().collect();
        assert_eq!(tags, vec![CategoryKey::Vegetarian, CategoryKey::ChefSpecial]);
        assert!(product.belongs_to(CategoryKey::Main));
        assert!(product.belongs_to(CategoryKey::Vegetarian));
        assert!(!product.belongs_to(CategoryKey::Beverage));
    }

    #[test]
    fn test_product_missing_fields_degrade_to_defaults() {
        let product: Product = serde_json::from_str(
            r#"{"id": "p9", "name": "Mystery dish", "category": "main"}"#,
        )
        .unwrap();

        assert_eq!(product.unit_price, Money::zero());
        assert_eq!(product.min_quantity, 1);
        assert!(product.available);
        assert!(product.tags.is_empty());
    }

    #[test]
    fn test_zero_minimum_quantity_is_treated_as_one() {
        let product = Product::new("p1", "Bread", "side", Money::from_cents(100)).with_min_quantity(0);
        assert_eq!(product.minimum(), 1);
    }

    #[test]
    fn test_menu_offers_all_products_when_unrestricted() {
        let open = Menu::new("open", "Open", Money::from_euros(20));
        assert!(open.offers(&ProductId::new("anything")));

        let restricted = open.clone().with_products(["p1"]);
        assert!(restricted.offers(&ProductId::new("p1")));
        assert!(!restricted.offers(&ProductId::new("p2")));
    }

    #[test]
    fn test_catalog_products_for_filters_menu_category_and_availability() {
        let menu = Menu::new("m", "Menu", Money::from_euros(30)).with_products(["a", "b", "c"]);
        let mut unavailable = Product::new("c", "Gone", "main", Money::from_cents(100));
        unavailable.available = false;
        let catalog = Catalog {
            menus: vec![menu.clone()],
            products: vec![
                Product::new("a", "Steak", "main", Money::from_cents(2000)),
                Product::new("b", "Salad", "starter", Money::from_cents(500)),
                unavailable,
                Product::new("d", "Fish", "main", Money::from_cents(1800)),
            ],
            accessories: vec![],
        };

        let ids: Vec<_> = catalog
            .products_for(&menu, CategoryKey::Main)
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn test_closure_lookup() {
        let date = NaiveDate::from_ymd_opt(2026, 12, 24).unwrap();
        let constraints = SystemConstraints {
            pause: PauseStatus::default(),
            closed_dates: vec![ClosedDate {
                date,
                reason: Some("Holidays".to_string()),
            }],
        };
        assert!(constraints.closure_on(date).is_some());
        assert!(constraints.closure_on(date.succ_opt().unwrap()).is_none());
    }

    #[test]
    fn test_catalog_from_json_and_require_menu() {
        let catalog = Catalog::from_json(
            r#"{"menus": [{"id": "m1", "name": "Buffet", "price_per_guest": 2500,
                "steps": [{"category": "Mains", "included": 2}]}]}"#,
        )
        .unwrap();

        let menu = catalog.require_menu(&MenuId::new("m1")).unwrap();
        assert_eq!(menu.price_per_guest, Money::from_euros(25));
        assert!(matches!(
            catalog.require_menu(&MenuId::new("m2")),
            Err(DomainError::NotFound { entity: "menu", .. })
        ));
        assert!(matches!(
            Catalog::from_json("not json"),
            Err(DomainError::Serialization(_))
        ));
    }
}
