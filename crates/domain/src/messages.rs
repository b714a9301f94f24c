//! Display strings for validation errors and blocking notices.
//!
//! Lookups never fail: a missing key yields `None` from [`Messages::lookup`]
//! and the caller's fallback from [`Messages::text_or`].

use std::collections::HashMap;

/// English texts for every message key the engine emits.
const ENGLISH: &[(&str, &str)] = &[
    ("validation.event.occasion_required", "Please choose the type of occasion."),
    ("validation.event.service_type_required", "Please choose a service type."),
    ("validation.event.date_required", "Please choose the event date."),
    ("validation.event.date_too_soon", "The event date is too soon for this number of guests."),
    ("validation.event.time_required", "Please choose the event time."),
    ("validation.event.guests_too_few", "The number of guests is below the minimum."),
    ("validation.event.postal_code_invalid", "Please enter a valid 5-digit postal code."),
    ("validation.menu.required", "Please choose a menu."),
    ("validation.menu.unknown", "The selected menu is no longer available."),
    ("validation.menu.guests_too_few", "This menu requires more guests."),
    ("validation.category.not_enough", "Please select more dishes in this category."),
    ("validation.order.minimum_not_met", "The order does not reach the minimum order value."),
    ("validation.contact.first_name_required", "Please enter your first name."),
    ("validation.contact.last_name_required", "Please enter your last name."),
    ("validation.contact.email_invalid", "Please enter a valid email address."),
    ("validation.contact.phone_invalid", "Please enter a valid phone number."),
    ("validation.contact.company_required", "Please enter your company name."),
    ("validation.payment.method_required", "Please choose a payment method."),
    ("validation.payment.card_number_invalid", "The card number is invalid."),
    ("validation.payment.card_expiry_invalid", "The expiry date must use the MM/YY format."),
    ("validation.payment.card_cvc_invalid", "The security code is invalid."),
    ("validation.payment.card_holder_required", "Please enter the card holder's name."),
    ("validation.terms.required", "Please accept the terms and conditions."),
    ("blocked.ordering_paused", "Ordering is currently paused."),
    ("blocked.date_closed", "We are closed on the selected date. Please choose another date."),
    ("notice.postal_lookup_failed", "We could not look up this postal code."),
    ("notice.catalog_load_failed", "The menus could not be loaded. Please try again."),
    ("notice.status_refresh_failed", "We could not check current availability."),
    ("notice.submission_failed", "Your order could not be submitted. Please try again."),
    ("notice.selections_dropped", "Some items are no longer available and were removed from your order."),
];

/// A message table, English by default, optionally overlaid with translations.
#[derive(Debug, Clone)]
pub struct Messages {
    texts: HashMap<String, String>,
}

impl Messages {
    /// The built-in English table.
    pub fn english() -> Self {
        Self {
            texts: ENGLISH
                .iter()
                .map(|(key, text)| (key.to_string(), text.to_string()))
                .collect(),
        }
    }

    /// An empty table; every lookup falls back.
    pub fn empty() -> Self {
        Self {
            texts: HashMap::new(),
        }
    }

    /// Overlays translated texts; keys not given keep their current text.
    pub fn with_overrides<K, V>(mut self, overrides: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.texts
            .extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.texts.get(key).map(String::as_str)
    }

    pub fn text_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.lookup(key).unwrap_or(default)
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::english()
    }
}

/// The English text for a key, or the key itself when unknown.
pub fn english(key: &'static str) -> &'static str {
    ENGLISH
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, text)| *text)
        .unwrap_or(key)
}
