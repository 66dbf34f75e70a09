//! Purchase repository implementation

use sqlx::{FromRow, PgPool};
use chrono::Utc;
use crate::models::cart::{CheckoutOutcome, PurchaseReceipt, PurchasedItem};
use crate::models::purchase::{PurchaseDetail, PurchaseSummary};
use crate::models::Page;
use crate::utils::errors::ShopError;
use crate::utils::helpers::{calculate_offset, from_cents, max_page, to_cents};

#[derive(Debug, FromRow)]
struct PendingLine {
    category_id: i32,
    subcategory_id: i32,
    quantity: i32,
    name: String,
}

#[derive(Clone)]
#[derive(Debug)]
pub struct PurchaseRepository {
    pool: PgPool,
}

impl PurchaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Buy the whole cart inside one transaction
    ///
    /// The buyer row and the picked items are locked until commit, so two
    /// checkouts can neither overspend a balance nor sell an item twice. Any
    /// early return drops the transaction, which rolls it back.
    pub async fn checkout(&self, telegram_id: i64) -> Result<CheckoutOutcome, ShopError> {
        let mut tx = self.pool.begin().await?;

        let balance: f64 = sqlx::query_scalar(
            "SELECT balance FROM users WHERE telegram_id = $1 FOR UPDATE",
        )
        .bind(telegram_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ShopError::UserNotFound { telegram_id })?;

        let lines = sqlx::query_as::<_, PendingLine>(
            r#"
            SELECT c.category_id, c.subcategory_id, c.quantity, s.name
            FROM cart_items c
            JOIN subcategories s ON s.id = c.subcategory_id
            WHERE c.user_id = $1
            ORDER BY c.id
            "#,
        )
        .bind(telegram_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Ok(CheckoutOutcome::EmptyCart);
        }

        let mut items: Vec<PurchasedItem> = Vec::new();
        for line in &lines {
            let picked = sqlx::query_as::<_, PurchasedItem>(
                r#"
                SELECT id AS item_id, price, description, description_translations, private_data
                FROM items
                WHERE category_id = $1 AND subcategory_id = $2 AND NOT is_sold
                ORDER BY price, id
                LIMIT $3
                FOR UPDATE SKIP LOCKED
                "#,
            )
            .bind(line.category_id)
            .bind(line.subcategory_id)
            .bind(i64::from(line.quantity))
            .fetch_all(&mut *tx)
            .await?;

            if picked.len() < line.quantity as usize {
                return Ok(CheckoutOutcome::OutOfStock {
                    subcategory: line.name.clone(),
                });
            }
            items.extend(picked);
        }

        let total_cents: i64 = items.iter().map(|item| to_cents(item.price)).sum();
        let total = from_cents(total_cents);
        if total_cents > to_cents(balance) {
            return Ok(CheckoutOutcome::InsufficientBalance {
                required: total,
                balance,
            });
        }
        let balance_left = from_cents(to_cents(balance) - total_cents);

        let item_ids: Vec<i32> = items.iter().map(|item| item.item_id).collect();
        let quantity = i32::try_from(items.len())
            .map_err(|_| ShopError::InvalidInput("cart is too large".to_string()))?;

        sqlx::query("UPDATE users SET balance = $2, updated_at = $3 WHERE telegram_id = $1")
            .bind(telegram_id)
            .bind(balance_left)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        let purchase_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO buys (buyer_id, quantity, total_price, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(telegram_id)
        .bind(quantity)
        .bind(total)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO buy_items (buy_id, item_id) SELECT $1, UNNEST($2::int[])")
            .bind(purchase_id)
            .bind(&item_ids)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE items SET is_sold = TRUE, is_new = FALSE WHERE id = ANY($1)")
            .bind(&item_ids)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(telegram_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(CheckoutOutcome::Purchased(PurchaseReceipt {
            purchase_id,
            total,
            balance_left,
            items,
        }))
    }

    /// Purchases of a buyer, newest first
    pub async fn page(&self, telegram_id: i64, page: u16, page_size: u32) -> Result<Page<PurchaseSummary>, ShopError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM buys WHERE buyer_id = $1")
            .bind(telegram_id)
            .fetch_one(&self.pool)
            .await?;
        let last = max_page(total, page_size);
        let page = page.min(last);

        let purchases = sqlx::query_as::<_, PurchaseSummary>(
            r#"
            SELECT id, quantity, total_price, created_at FROM buys
            WHERE buyer_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(telegram_id)
        .bind(i64::from(page_size))
        .bind(calculate_offset(page, page_size))
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(purchases, page, last))
    }

    /// One purchase of a buyer with the items it handed over
    pub async fn detail(&self, telegram_id: i64, purchase_id: i32) -> Result<Option<PurchaseDetail>, ShopError> {
        let summary = sqlx::query_as::<_, PurchaseSummary>(
            "SELECT id, quantity, total_price, created_at FROM buys WHERE id = $1 AND buyer_id = $2",
        )
        .bind(purchase_id)
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(summary) = summary else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, PurchasedItem>(
            r#"
            SELECT i.id AS item_id, i.price, i.description, i.description_translations, i.private_data
            FROM buy_items b
            JOIN items i ON i.id = b.item_id
            WHERE b.buy_id = $1
            ORDER BY i.id
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(PurchaseDetail { summary, items }))
    }
}
