//! Category classification.
//!
//! Catalog labels are free text ("Mains", "Chef's Special", "drinks"). Every
//! label that drives a wizard step or a product's grouping is normalized into
//! a [`CategoryKey`] here; anything unrecognized is reported as `None` and the
//! caller drops it.

use serde::{Deserialize, Serialize};

/// Normalized identifier for a food category or a descriptive tag.
///
/// The first five variants are the *core* categories every product belongs to
/// exactly one of. The remaining variants are *tag* categories a product may
/// carry in addition to its core category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryKey {
    Starter,
    Main,
    Side,
    Dessert,
    Beverage,

    Vegetarian,
    Vegan,
    GlutenFree,
    Seasonal,
    ChefSpecial,
    FingerFood,
    Soup,
    Salad,
    Barbecue,
    Premium,
}

impl CategoryKey {
    /// The core categories in wizard order.
    pub const CORE: [CategoryKey; 5] = [
        CategoryKey::Starter,
        CategoryKey::Main,
        CategoryKey::Side,
        CategoryKey::Dessert,
        CategoryKey::Beverage,
    ];

    /// Returns true for the five core categories.
    pub fn is_core(&self) -> bool {
        matches!(
            self,
            CategoryKey::Starter
                | CategoryKey::Main
                | CategoryKey::Side
                | CategoryKey::Dessert
                | CategoryKey::Beverage
        )
    }

    /// Returns true for descriptive tag categories.
    pub fn is_tag(&self) -> bool {
        !self.is_core()
    }

    /// Returns the canonical key as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKey::Starter => "starter",
            CategoryKey::Main => "main",
            CategoryKey::Side => "side",
            CategoryKey::Dessert => "dessert",
            CategoryKey::Beverage => "beverage",
            CategoryKey::Vegetarian => "vegetarian",
            CategoryKey::Vegan => "vegan",
            CategoryKey::GlutenFree => "gluten-free",
            CategoryKey::Seasonal => "seasonal",
            CategoryKey::ChefSpecial => "chef-special",
            CategoryKey::FingerFood => "finger-food",
            CategoryKey::Soup => "soup",
            CategoryKey::Salad => "salad",
            CategoryKey::Barbecue => "barbecue",
            CategoryKey::Premium => "premium",
        }
    }

    /// Default display label used when a step definition carries none.
    pub fn display_label(&self) -> &'static str {
        match self {
            CategoryKey::Starter => "Starters",
            CategoryKey::Main => "Main courses",
            CategoryKey::Side => "Side dishes",
            CategoryKey::Dessert => "Desserts",
            CategoryKey::Beverage => "Beverages",
            CategoryKey::Vegetarian => "Vegetarian",
            CategoryKey::Vegan => "Vegan",
            CategoryKey::GlutenFree => "Gluten-free",
            CategoryKey::Seasonal => "Seasonal",
            CategoryKey::ChefSpecial => "Chef's specials",
            CategoryKey::FingerFood => "Finger food",
            CategoryKey::Soup => "Soups",
            CategoryKey::Salad => "Salads",
            CategoryKey::Barbecue => "Barbecue",
            CategoryKey::Premium => "Premium",
        }
    }
}

impl std::fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned by [`CategoryKey::from_str`](std::str::FromStr) for unknown labels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized category label: {0:?}")]
pub struct UnknownCategory(pub String);

impl std::str::FromStr for CategoryKey {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        classify(s).ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Alias table over normalized labels (lower-case ASCII letters only).
const ALIASES: &[(&str, CategoryKey)] = &[
    ("starter", CategoryKey::Starter),
    ("starters", CategoryKey::Starter),
    ("appetizer", CategoryKey::Starter),
    ("appetizers", CategoryKey::Starter),
    ("appetiser", CategoryKey::Starter),
    ("appetisers", CategoryKey::Starter),
    ("main", CategoryKey::Main),
    ("mains", CategoryKey::Main),
    ("maincourse", CategoryKey::Main),
    ("maincourses", CategoryKey::Main),
    ("entree", CategoryKey::Main),
    ("entrees", CategoryKey::Main),
    ("side", CategoryKey::Side),
    ("sides", CategoryKey::Side),
    ("sidedish", CategoryKey::Side),
    ("sidedishes", CategoryKey::Side),
    ("dessert", CategoryKey::Dessert),
    ("desserts", CategoryKey::Dessert),
    ("sweets", CategoryKey::Dessert),
    ("beverage", CategoryKey::Beverage),
    ("beverages", CategoryKey::Beverage),
    ("drink", CategoryKey::Beverage),
    ("drinks", CategoryKey::Beverage),
    ("vegetarian", CategoryKey::Vegetarian),
    ("veggie", CategoryKey::Vegetarian),
    ("vegan", CategoryKey::Vegan),
    ("glutenfree", CategoryKey::GlutenFree),
    ("seasonal", CategoryKey::Seasonal),
    ("chefspecial", CategoryKey::ChefSpecial),
    ("chefspecials", CategoryKey::ChefSpecial),
    ("chefsspecial", CategoryKey::ChefSpecial),
    ("chefsspecials", CategoryKey::ChefSpecial),
    ("fingerfood", CategoryKey::FingerFood),
    ("soup", CategoryKey::Soup),
    ("soups", CategoryKey::Soup),
    ("salad", CategoryKey::Salad),
    ("salads", CategoryKey::Salad),
    ("barbecue", CategoryKey::Barbecue),
    ("bbq", CategoryKey::Barbecue),
    ("grill", CategoryKey::Barbecue),
    ("premium", CategoryKey::Premium),
];

/// Lower-cases a label and strips everything that is not an ASCII letter.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Classifies a free-text label into a [`CategoryKey`].
///
/// Returns `None` for anything outside the alias table; never panics.
pub fn classify(label: &str) -> Option<CategoryKey> {
    let normalized = normalize_label(label);
    if normalized.is_empty() {
        return None;
    }

    ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, key)| *key)
}

/// Classifies a core category label; tag labels yield `None`.
pub fn classify_core(label: &str) -> Option<CategoryKey> {
    classify(label).filter(CategoryKey::is_core)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_aliases() {
        assert_eq!(classify("Starters"), Some(CategoryKey::Starter));
        assert_eq!(classify("mains"), Some(CategoryKey::Main));
        assert_eq!(classify("Entrée"), None);
        assert_eq!(classify("Entree"), Some(CategoryKey::Main));
        assert_eq!(classify("DRINKS"), Some(CategoryKey::Beverage));
        assert_eq!(classify("beverages"), Some(CategoryKey::Beverage));
    }

    #[test]
    fn test_classify_strips_non_letters() {
        assert_eq!(classify("chef-special"), Some(CategoryKey::ChefSpecial));
        assert_eq!(classify("Chef's Specials"), Some(CategoryKey::ChefSpecial));
        assert_eq!(classify(" Gluten Free! "), Some(CategoryKey::GlutenFree));
        assert_eq!(classify("main_course 2"), Some(CategoryKey::Main));
    }

    #[test]
    fn test_classify_unknown_is_none() {
        assert_eq!(classify("cutlery"), None);
        assert_eq!(classify(""), None);
        assert_eq!(classify("1234 !!"), None);
    }

    #[test]
    fn test_classify_core_rejects_tags() {
        assert_eq!(classify_core("mains"), Some(CategoryKey::Main));
        assert_eq!(classify_core("vegetarian"), None);
    }

    #[test]
    fn test_core_and_tag_partition() {
        for key in CategoryKey::CORE {
            assert!(key.is_core());
            assert!(!key.is_tag());
        }
        assert!(CategoryKey::Seasonal.is_tag());
    }

    #[test]
    fn test_from_str_round_trips_canonical_names() {
        for key in [
            CategoryKey::Main,
            CategoryKey::GlutenFree,
            CategoryKey::ChefSpecial,
            CategoryKey::FingerFood,
        ] {
            assert_eq!(key.as_str().parse::<CategoryKey>(), Ok(key));
        }
        assert!("tableware".parse::<CategoryKey>().is_err());
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&CategoryKey::ChefSpecial).unwrap();
        assert_eq!(json, "\"chef-special\"");
    }
}
