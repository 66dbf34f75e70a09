//! Storage seams
//!
//! Handlers only see these traits. [`DatabaseService`](super::DatabaseService)
//! implements them over PostgreSQL; tests use an in-memory implementation.

use async_trait::async_trait;

use crate::models::{
    CartLine, Category, CheckoutOutcome, NewItem, Offer, Page, Preference, PurchaseDetail,
    PurchaseSummary, User, UserIdentity,
};
use crate::utils::errors::Result;

/// Persisted display preferences
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Stored preference of `identity`; unknown users have an empty preference
    async fn get_preference(&self, identity: &UserIdentity) -> Result<Preference>;

    /// Store the set parts of `preference`, leaving unset parts untouched
    async fn set_preference(&self, identity: &UserIdentity, preference: &Preference) -> Result<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find the user, registering them on first contact
    async fn ensure_user(&self, identity: &UserIdentity) -> Result<User>;

    async fn find_user(&self, telegram_id: i64) -> Result<Option<User>>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Categories that still have unsold items
    async fn categories(&self, page: u16, page_size: u32) -> Result<Page<Category>>;

    async fn category(&self, category_id: i32) -> Result<Option<Category>>;

    /// Subcategories of `category_id` that still have unsold items
    async fn offers(&self, category_id: i32, page: u16, page_size: u32) -> Result<Page<Offer>>;

    async fn offer(&self, category_id: i32, subcategory_id: i32) -> Result<Option<Offer>>;

    /// Store imported items, creating categories and subcategories on demand
    async fn add_items(&self, items: Vec<NewItem>) -> Result<usize>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    /// Add `quantity` to the cart line of a subcategory, creating it if needed
    async fn add_to_cart(
        &self,
        telegram_id: i64,
        category_id: i32,
        subcategory_id: i32,
        quantity: i32,
    ) -> Result<()>;

    async fn cart(&self, telegram_id: i64) -> Result<Vec<CartLine>>;

    /// Remove one line; false when it does not exist or belongs to someone else
    async fn remove_cart_line(&self, telegram_id: i64, line_id: i32) -> Result<bool>;
}

#[async_trait]
pub trait PurchaseStore: Send + Sync {
    /// Buy the whole cart in one step, or report why it cannot be bought
    async fn checkout(&self, telegram_id: i64) -> Result<CheckoutOutcome>;

    async fn purchases(&self, telegram_id: i64, page: u16, page_size: u32) -> Result<Page<PurchaseSummary>>;

    async fn purchase(&self, telegram_id: i64, purchase_id: i32) -> Result<Option<PurchaseDetail>>;
}

/// Everything the shop screens need from storage
pub trait ShopStore: PreferenceStore + UserStore + CatalogStore + CartStore + PurchaseStore {}

impl<T> ShopStore for T where T: PreferenceStore + UserStore + CatalogStore + CartStore + PurchaseStore {}
