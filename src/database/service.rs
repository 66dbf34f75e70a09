//! Database service layer
//! 
//! This module provides a high-level interface to database operations and
//! implements the storage seams over PostgreSQL.

use async_trait::async_trait;

use crate::database::store::{CartStore, CatalogStore, PreferenceStore, PurchaseStore, UserStore};
use crate::database::{
    CartRepository, CategoryRepository, DatabasePool, ItemRepository, PurchaseRepository,
    UserRepository,
};
use crate::models::*;
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub categories: CategoryRepository,
    pub items: ItemRepository,
    pub carts: CartRepository,
    pub purchases: PurchaseRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool.clone()),
            items: ItemRepository::new(pool.clone()),
            carts: CartRepository::new(pool.clone()),
            purchases: PurchaseRepository::new(pool),
        }
    }
}

#[async_trait]
impl PreferenceStore for DatabaseService {
    async fn get_preference(&self, identity: &UserIdentity) -> Result<Preference> {
        self.users.get_preference(identity.telegram_id).await
    }

    async fn set_preference(&self, identity: &UserIdentity, preference: &Preference) -> Result<()> {
        self.users.set_preference(identity, preference).await
    }
}

#[async_trait]
impl UserStore for DatabaseService {
    async fn ensure_user(&self, identity: &UserIdentity) -> Result<User> {
        self.users.upsert(identity).await
    }

    async fn find_user(&self, telegram_id: i64) -> Result<Option<User>> {
        self.users.find_by_telegram_id(telegram_id).await
    }
}

#[async_trait]
impl CatalogStore for DatabaseService {
    async fn categories(&self, page: u16, page_size: u32) -> Result<Page<Category>> {
        self.categories.page_in_stock(page, page_size).await
    }

    async fn category(&self, category_id: i32) -> Result<Option<Category>> {
        self.categories.find_by_id(category_id).await
    }

    async fn offers(&self, category_id: i32, page: u16, page_size: u32) -> Result<Page<Offer>> {
        self.items.offers(category_id, page, page_size).await
    }

    async fn offer(&self, category_id: i32, subcategory_id: i32) -> Result<Option<Offer>> {
        self.items.offer(category_id, subcategory_id).await
    }

    async fn add_items(&self, items: Vec<NewItem>) -> Result<usize> {
        self.items.add_items(&items).await
    }
}

#[async_trait]
impl CartStore for DatabaseService {
    async fn add_to_cart(
        &self,
        telegram_id: i64,
        category_id: i32,
        subcategory_id: i32,
        quantity: i32,
    ) -> Result<()> {
        self.carts.add(telegram_id, category_id, subcategory_id, quantity).await
    }

    async fn cart(&self, telegram_id: i64) -> Result<Vec<CartLine>> {
        self.carts.lines(telegram_id).await
    }

    async fn remove_cart_line(&self, telegram_id: i64, line_id: i32) -> Result<bool> {
        self.carts.remove(telegram_id, line_id).await
    }
}

#[async_trait]
impl PurchaseStore for DatabaseService {
    async fn checkout(&self, telegram_id: i64) -> Result<CheckoutOutcome> {
        self.purchases.checkout(telegram_id).await
    }

    async fn purchases(&self, telegram_id: i64, page: u16, page_size: u32) -> Result<Page<PurchaseSummary>> {
        self.purchases.page(telegram_id, page, page_size).await
    }

    async fn purchase(&self, telegram_id: i64, purchase_id: i32) -> Result<Option<PurchaseDetail>> {
        self.purchases.detail(telegram_id, purchase_id).await
    }
}
