//! The mutable order draft owned by a wizard session.

use chrono::{NaiveDate, NaiveTime};
use common::{AccessoryId, MenuId, Money};
use serde::{Deserialize, Serialize};

use crate::catalog::Accessory;
use crate::selection::SelectionStore;

/// How the food is served at the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// Delivered, no staff on site.
    DropOff,
    /// Delivered and set up as a buffet.
    Buffet,
    /// Staffed service for the whole event.
    FullService,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    #[default]
    Private,
    Business,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Invoice,
    BankTransfer,
    Card,
    Paypal,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Invoice => "invoice",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Card => "card",
            PaymentMethod::Paypal => "paypal",
        }
    }
}

/// Card fields as typed by the customer. Only structurally checked here;
/// capture happens elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardDetails {
    pub number: String,
    /// `MM/YY`
    pub expiry: String,
    pub cvc: String,
    pub holder: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub special_requests: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventDetails {
    /// Occasion type, e.g. "wedding" or "corporate".
    pub occasion: Option<String>,
    pub service_type: Option<ServiceType>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub guest_count: u32,
    pub address: Address,
}

/// An accessory with its quantity. Charged per guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessorySelection {
    pub accessory: Accessory,
    pub quantity: u32,
}

impl AccessorySelection {
    /// Price × quantity × guests.
    pub fn cost(&self, guest_count: u32) -> Money {
        self.accessory
            .price
            .multiply(self.quantity)
            .multiply(guest_count)
    }
}

/// The full state of an order being configured.
///
/// A draft has no identity; it becomes an order only when the submission
/// collaborator accepts the payload assembled from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderDraft {
    pub event: EventDetails,
    pub menu_id: Option<MenuId>,
    pub selections: SelectionStore,
    pub accessories: Vec<AccessorySelection>,
    pub contact: ContactInfo,
    pub customer_type: CustomerType,
    pub payment_method: Option<PaymentMethod>,
    pub card: Option<CardDetails>,
    pub terms_accepted: bool,
}

impl OrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_business(&self) -> bool {
        self.customer_type == CustomerType::Business
    }

    pub fn accessory(&self, id: &AccessoryId) -> Option<&AccessorySelection> {
        self.accessories.iter().find(|a| &a.accessory.id == id)
    }

    /// Sets an accessory quantity, clamped up to the accessory minimum.
    ///
    /// Never drops the accessory implicitly; use
    /// [`remove_accessory`](Self::remove_accessory) for that. Returns the
    /// stored quantity.
    pub fn set_accessory(&mut self, accessory: &Accessory, quantity: u32) -> u32 {
        let quantity = quantity.max(accessory.minimum());
        match self
            .accessories
            .iter_mut()
            .find(|a| a.accessory.id == accessory.id)
        {
            Some(existing) => {
                existing.accessory = accessory.clone();
                existing.quantity = quantity;
            }
            None => self.accessories.push(AccessorySelection {
                accessory: accessory.clone(),
                quantity,
            }),
        }
        quantity
    }

    pub fn remove_accessory(&mut self, id: &AccessoryId) -> Option<AccessorySelection> {
        let index = self.accessories.iter().position(|a| &a.accessory.id == id)?;
        Some(self.accessories.remove(index))
    }
}
