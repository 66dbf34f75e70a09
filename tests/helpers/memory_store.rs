//! In-memory shop store
//!
//! Implements every store trait over plain collections so screen flows can be
//! exercised without PostgreSQL. Semantics follow the SQL repositories: offers
//! only list unsold items, checkout takes the cheapest items first.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use tokio::sync::Mutex;

use shopbot::database::store::{CartStore, CatalogStore, PreferenceStore, PurchaseStore, UserStore};
use shopbot::models::{
    CartLine, Category, CheckoutOutcome, Item, NewItem, Offer, Page, Preference, PurchaseDetail,
    PurchaseReceipt, PurchaseSummary, PurchasedItem, Subcategory, Translations, User, UserIdentity,
};
use shopbot::utils::helpers::{calculate_offset, from_cents, max_page, to_cents};
use shopbot::{Result, ShopError};

#[derive(Debug, Clone)]
struct CartRow {
    id: i32,
    telegram_id: i64,
    category_id: i32,
    subcategory_id: i32,
    quantity: i32,
}

#[derive(Default)]
struct State {
    users: HashMap<i64, User>,
    categories: Vec<Category>,
    subcategories: Vec<Subcategory>,
    items: Vec<Item>,
    cart: Vec<CartRow>,
    purchases: Vec<(i64, PurchaseDetail)>,
    next_id: i32,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn unsold(&self, subcategory_id: i32) -> impl Iterator<Item = &Item> {
        self.items
            .iter()
            .filter(move |item| item.subcategory_id == subcategory_id && !item.is_sold)
    }

    fn offer(&self, subcategory: &Subcategory) -> Option<Offer> {
        let mut items: Vec<&Item> = self.unsold(subcategory.id).collect();
        items.sort_by(|a, b| a.price.total_cmp(&b.price));
        let cheapest = items.first()?;

        Some(Offer {
            category_id: subcategory.category_id,
            subcategory_id: subcategory.id,
            name: subcategory.name.clone(),
            translations: subcategory.translations.clone(),
            price: cheapest.price,
            available: items.len() as i64,
            description: cheapest.description.clone(),
            description_translations: cheapest.description_translations.clone(),
        })
    }

    fn user(&self, telegram_id: i64) -> Result<&User> {
        self.users
            .get(&telegram_id)
            .ok_or(ShopError::UserNotFound { telegram_id })
    }
}

fn page_of<T: Clone>(all: Vec<T>, page: u16, page_size: u32) -> Page<T> {
    let total = all.len() as i64;
    let last = max_page(total, page_size);
    let page = page.min(last);
    let entries = all
        .into_iter()
        .skip(calculate_offset(page, page_size) as usize)
        .take(page_size as usize)
        .collect();
    Page::new(entries, page, last)
}

fn translations(pairs: &[(&str, &str)]) -> Json<Translations> {
    Json(
        pairs
            .iter()
            .map(|(language, text)| (language.to_string(), text.to_string()))
            .collect(),
    )
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    preferences_down: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make preference reads fail as if the database were unreachable
    pub fn break_preferences(&self) {
        self.preferences_down.store(true, Ordering::SeqCst);
    }

    /// Add a category under a fixed id
    pub async fn add_category(&self, id: i32, name: &str, names: &[(&str, &str)]) {
        let mut state = self.state.lock().await;
        state.next_id = state.next_id.max(id);
        state.categories.push(Category {
            id,
            name: name.to_string(),
            translations: translations(names),
        });
    }

    /// Add a subcategory with `count` unsold items at `price`, returning its id
    pub async fn add_stock(
        &self,
        category_id: i32,
        name: &str,
        names: &[(&str, &str)],
        price: f64,
        count: usize,
    ) -> i32 {
        let mut state = self.state.lock().await;
        let subcategory_id = state.next_id();
        state.subcategories.push(Subcategory {
            id: subcategory_id,
            category_id,
            name: name.to_string(),
            translations: translations(names),
        });

        for n in 0..count {
            let id = state.next_id();
            state.items.push(Item {
                id,
                category_id,
                subcategory_id,
                price,
                description: format!("{} item", name),
                description_translations: Json(Translations::new()),
                private_data: format!("{}-secret-{}", name, n),
                is_sold: false,
                is_new: true,
                created_at: Utc::now(),
            });
        }
        subcategory_id
    }

    pub async fn set_balance(&self, identity: &UserIdentity, balance: f64) {
        self.ensure_user(identity).await.unwrap();
        let mut state = self.state.lock().await;
        if let Some(user) = state.users.get_mut(&identity.telegram_id) {
            user.balance = balance;
        }
    }

    pub async fn balance(&self, telegram_id: i64) -> f64 {
        self.state.lock().await.users[&telegram_id].balance
    }

    pub async fn unsold_count(&self, subcategory_id: i32) -> usize {
        self.state.lock().await.unsold(subcategory_id).count()
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn get_preference(&self, identity: &UserIdentity) -> Result<Preference> {
        if self.preferences_down.load(Ordering::SeqCst) {
            return Err(ShopError::Database(sqlx::Error::PoolTimedOut));
        }
        let state = self.state.lock().await;
        Ok(state
            .users
            .get(&identity.telegram_id)
            .map(|user| Preference {
                language: user.language.clone(),
                currency: user.currency.clone(),
            })
            .unwrap_or_default())
    }

    async fn set_preference(&self, identity: &UserIdentity, preference: &Preference) -> Result<()> {
        self.ensure_user(identity).await?;
        let mut state = self.state.lock().await;
        if let Some(user) = state.users.get_mut(&identity.telegram_id) {
            if preference.language.is_some() {
                user.language = preference.language.clone();
            }
            if preference.currency.is_some() {
                user.currency = preference.currency.clone();
            }
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn ensure_user(&self, identity: &UserIdentity) -> Result<User> {
        let mut state = self.state.lock().await;
        let id = state.users.len() as i64 + 1;
        let user = state.users.entry(identity.telegram_id).or_insert_with(|| User {
            id,
            telegram_id: identity.telegram_id,
            username: identity.username.clone(),
            language: None,
            currency: None,
            balance: 0.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        Ok(user.clone())
    }

    async fn find_user(&self, telegram_id: i64) -> Result<Option<User>> {
        Ok(self.state.lock().await.users.get(&telegram_id).cloned())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn categories(&self, page: u16, page_size: u32) -> Result<Page<Category>> {
        let state = self.state.lock().await;
        let in_stock = state
            .categories
            .iter()
            .filter(|category| state.items.iter().any(|i| i.category_id == category.id && !i.is_sold))
            .cloned()
            .collect();
        Ok(page_of(in_stock, page, page_size))
    }

    async fn category(&self, category_id: i32) -> Result<Option<Category>> {
        let state = self.state.lock().await;
        Ok(state.categories.iter().find(|c| c.id == category_id).cloned())
    }

    async fn offers(&self, category_id: i32, page: u16, page_size: u32) -> Result<Page<Offer>> {
        let state = self.state.lock().await;
        let offers = state
            .subcategories
            .iter()
            .filter(|subcategory| subcategory.category_id == category_id)
            .filter_map(|subcategory| state.offer(subcategory))
            .collect();
        Ok(page_of(offers, page, page_size))
    }

    async fn offer(&self, category_id: i32, subcategory_id: i32) -> Result<Option<Offer>> {
        let state = self.state.lock().await;
        Ok(state
            .subcategories
            .iter()
            .find(|s| s.id == subcategory_id && s.category_id == category_id)
            .and_then(|subcategory| state.offer(subcategory)))
    }

    async fn add_items(&self, items: Vec<NewItem>) -> Result<usize> {
        let mut state = self.state.lock().await;
        let count = items.len();

        for new in items {
            let existing = state
                .categories
                .iter()
                .find(|c| c.name == new.category.base)
                .map(|c| c.id);
            let category_id = match existing {
                Some(id) => id,
                None => {
                    let id = state.next_id();
                    state.categories.push(Category {
                        id,
                        name: new.category.base.clone(),
                        translations: Json(new.category.translations.clone()),
                    });
                    id
                }
            };
            let existing = state
                .subcategories
                .iter()
                .find(|s| s.category_id == category_id && s.name == new.subcategory.base)
                .map(|s| s.id);
            let subcategory_id = match existing {
                Some(id) => id,
                None => {
                    let id = state.next_id();
                    state.subcategories.push(Subcategory {
                        id,
                        category_id,
                        name: new.subcategory.base.clone(),
                        translations: Json(new.subcategory.translations.clone()),
                    });
                    id
                }
            };

            let id = state.next_id();
            state.items.push(Item {
                id,
                category_id,
                subcategory_id,
                price: new.price,
                description: new.description.base,
                description_translations: Json(new.description.translations),
                private_data: new.private_data,
                is_sold: false,
                is_new: true,
                created_at: Utc::now(),
            });
        }
        Ok(count)
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn add_to_cart(
        &self,
        telegram_id: i64,
        category_id: i32,
        subcategory_id: i32,
        quantity: i32,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(row) = state
            .cart
            .iter_mut()
            .find(|row| row.telegram_id == telegram_id && row.subcategory_id == subcategory_id)
        {
            row.quantity += quantity;
            return Ok(());
        }

        let id = state.next_id();
        state.cart.push(CartRow {
            id,
            telegram_id,
            category_id,
            subcategory_id,
            quantity,
        });
        Ok(())
    }

    async fn cart(&self, telegram_id: i64) -> Result<Vec<CartLine>> {
        let state = self.state.lock().await;
        let lines = state
            .cart
            .iter()
            .filter(|row| row.telegram_id == telegram_id)
            .filter_map(|row| {
                let subcategory = state.subcategories.iter().find(|s| s.id == row.subcategory_id)?;
                let offer = state.offer(subcategory);
                Some(CartLine {
                    id: row.id,
                    category_id: row.category_id,
                    subcategory_id: row.subcategory_id,
                    name: subcategory.name.clone(),
                    translations: subcategory.translations.clone(),
                    quantity: row.quantity,
                    unit_price: offer.as_ref().map(|o| o.price),
                    available: offer.map_or(0, |o| o.available),
                })
            })
            .collect();
        Ok(lines)
    }

    async fn remove_cart_line(&self, telegram_id: i64, line_id: i32) -> Result<bool> {
        let mut state = self.state.lock().await;
        let before = state.cart.len();
        state
            .cart
            .retain(|row| !(row.id == line_id && row.telegram_id == telegram_id));
        Ok(state.cart.len() < before)
    }
}

#[async_trait]
impl PurchaseStore for MemoryStore {
    async fn checkout(&self, telegram_id: i64) -> Result<CheckoutOutcome> {
        let mut state = self.state.lock().await;
        let balance = state.user(telegram_id)?.balance;

        let rows: Vec<CartRow> = state
            .cart
            .iter()
            .filter(|row| row.telegram_id == telegram_id)
            .cloned()
            .collect();
        if rows.is_empty() {
            return Ok(CheckoutOutcome::EmptyCart);
        }

        let mut picked = Vec::new();
        for row in &rows {
            let mut items: Vec<&Item> = state.unsold(row.subcategory_id).collect();
            items.sort_by(|a, b| a.price.total_cmp(&b.price));
            if items.len() < row.quantity as usize {
                let subcategory = state
                    .subcategories
                    .iter()
                    .find(|s| s.id == row.subcategory_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default();
                return Ok(CheckoutOutcome::OutOfStock { subcategory });
            }
            picked.extend(items.into_iter().take(row.quantity as usize).cloned());
        }

        let total_cents: i64 = picked.iter().map(|item| to_cents(item.price)).sum();
        let total = from_cents(total_cents);
        if total_cents > to_cents(balance) {
            return Ok(CheckoutOutcome::InsufficientBalance { required: total, balance });
        }

        let balance_left = from_cents(to_cents(balance) - total_cents);
        if let Some(user) = state.users.get_mut(&telegram_id) {
            user.balance = balance_left;
        }
        for item in state.items.iter_mut() {
            if picked.iter().any(|p| p.id == item.id) {
                item.is_sold = true;
            }
        }
        state.cart.retain(|row| row.telegram_id != telegram_id);

        let purchase_id = state.next_id();
        let items: Vec<PurchasedItem> = picked
            .into_iter()
            .map(|item| PurchasedItem {
                item_id: item.id,
                price: item.price,
                description: item.description,
                description_translations: item.description_translations,
                private_data: item.private_data,
            })
            .collect();
        state.purchases.push((
            telegram_id,
            PurchaseDetail {
                summary: PurchaseSummary {
                    id: purchase_id,
                    quantity: items.len() as i32,
                    total_price: total,
                    created_at: Utc::now(),
                },
                items: items.clone(),
            },
        ));

        Ok(CheckoutOutcome::Purchased(PurchaseReceipt {
            purchase_id,
            total,
            balance_left,
            items,
        }))
    }

    async fn purchases(&self, telegram_id: i64, page: u16, page_size: u32) -> Result<Page<PurchaseSummary>> {
        let state = self.state.lock().await;
        let summaries = state
            .purchases
            .iter()
            .rev()
            .filter(|(owner, _)| *owner == telegram_id)
            .map(|(_, detail)| detail.summary.clone())
            .collect();
        Ok(page_of(summaries, page, page_size))
    }

    async fn purchase(&self, telegram_id: i64, purchase_id: i32) -> Result<Option<PurchaseDetail>> {
        let state = self.state.lock().await;
        Ok(state
            .purchases
            .iter()
            .find(|(owner, detail)| *owner == telegram_id && detail.summary.id == purchase_id)
            .map(|(_, detail)| detail.clone()))
    }
}
