//! Purchase history models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::cart::PurchasedItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PurchaseSummary {
    pub id: i32,
    pub quantity: i32,
    /// Amount charged in the base currency
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseDetail {
    pub summary: PurchaseSummary,
    pub items: Vec<PurchasedItem>,
}
