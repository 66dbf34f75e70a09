//! Cart models

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::catalog::{localized, Translations};

/// One cart line joined with what is currently offered for it
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CartLine {
    pub id: i32,
    pub category_id: i32,
    pub subcategory_id: i32,
    pub name: String,
    pub translations: Json<Translations>,
    pub quantity: i32,
    /// Cheapest unsold unit price, absent when nothing is left in stock
    pub unit_price: Option<f64>,
    pub available: i64,
}

impl CartLine {
    pub fn display_name(&self, language: &str) -> &str {
        localized(&self.name, &self.translations, language)
    }

    /// Expected line total in the base currency
    pub fn total(&self) -> f64 {
        self.unit_price.unwrap_or(0.0) * f64::from(self.quantity)
    }
}

/// An item handed over by a purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PurchasedItem {
    pub item_id: i32,
    pub price: f64,
    pub description: String,
    pub description_translations: Json<Translations>,
    pub private_data: String,
}

impl PurchasedItem {
    pub fn display_description(&self, language: &str) -> &str {
        localized(&self.description, &self.description_translations, language)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub purchase_id: i32,
    /// Amount charged in the base currency
    pub total: f64,
    pub balance_left: f64,
    pub items: Vec<PurchasedItem>,
}

/// Result of turning a cart into a purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CheckoutOutcome {
    Purchased(PurchaseReceipt),
    InsufficientBalance { required: f64, balance: f64 },
    OutOfStock { subcategory: String },
    EmptyCart,
}
