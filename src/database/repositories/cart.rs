//! Cart repository implementation

use sqlx::PgPool;
use crate::models::cart::CartLine;
use crate::utils::errors::ShopError;

#[derive(Clone)]
#[derive(Debug)]
pub struct CartRepository {
    pool: PgPool,
}

impl CartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add to the user's line of a subcategory, merging quantities
    pub async fn add(
        &self,
        telegram_id: i64,
        category_id: i32,
        subcategory_id: i32,
        quantity: i32,
    ) -> Result<(), ShopError> {
        sqlx::query(
            r#"
            INSERT INTO cart_items (user_id, category_id, subcategory_id, quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, subcategory_id) DO UPDATE
            SET quantity = cart_items.quantity + EXCLUDED.quantity
            "#,
        )
        .bind(telegram_id)
        .bind(category_id)
        .bind(subcategory_id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn lines(&self, telegram_id: i64) -> Result<Vec<CartLine>, ShopError> {
        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT c.id, c.category_id, c.subcategory_id, s.name, s.translations, c.quantity,
                   MIN(i.price) AS unit_price,
                   COUNT(i.id) AS available
            FROM cart_items c
            JOIN subcategories s ON s.id = c.subcategory_id
            LEFT JOIN items i ON i.category_id = c.category_id
                             AND i.subcategory_id = c.subcategory_id
                             AND NOT i.is_sold
            WHERE c.user_id = $1
            GROUP BY c.id, s.id
            ORDER BY c.id
            "#,
        )
        .bind(telegram_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    pub async fn remove(&self, telegram_id: i64, line_id: i32) -> Result<bool, ShopError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
            .bind(line_id)
            .bind(telegram_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
