//! Item repository implementation

use sqlx::types::Json;
use sqlx::PgPool;
use chrono::Utc;
use crate::models::catalog::{NewItem, Offer};
use crate::models::Page;
use crate::utils::errors::ShopError;
use crate::utils::helpers::{calculate_offset, max_page};
use super::{CategoryRepository, SubcategoryRepository};

/// Subcategories with unsold stock, priced by their cheapest item
const OFFER_SELECT: &str = r#"
    SELECT i.category_id, s.id AS subcategory_id, s.name, s.translations,
           MIN(i.price) AS price,
           COUNT(i.id) AS available,
           (ARRAY_AGG(i.description ORDER BY i.price, i.id))[1] AS description,
           (ARRAY_AGG(i.description_translations ORDER BY i.price, i.id))[1] AS description_translations
    FROM items i
    JOIN subcategories s ON s.id = i.subcategory_id
    WHERE i.category_id = $1 AND NOT i.is_sold
"#;

#[derive(Clone)]
#[derive(Debug)]
pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn offers(&self, category_id: i32, page: u16, page_size: u32) -> Result<Page<Offer>, ShopError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT subcategory_id) FROM items WHERE category_id = $1 AND NOT is_sold",
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;
        let last = max_page(total, page_size);
        let page = page.min(last);

        let offers = sqlx::query_as::<_, Offer>(&format!(
            "{OFFER_SELECT} GROUP BY i.category_id, s.id ORDER BY s.name, s.id LIMIT $2 OFFSET $3"
        ))
        .bind(category_id)
        .bind(i64::from(page_size))
        .bind(calculate_offset(page, page_size))
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(offers, page, last))
    }

    pub async fn offer(&self, category_id: i32, subcategory_id: i32) -> Result<Option<Offer>, ShopError> {
        let offer = sqlx::query_as::<_, Offer>(&format!(
            "{OFFER_SELECT} AND i.subcategory_id = $2 GROUP BY i.category_id, s.id"
        ))
        .bind(category_id)
        .bind(subcategory_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(offer)
    }

    /// Store a batch of imported items in one transaction
    pub async fn add_items(&self, items: &[NewItem]) -> Result<usize, ShopError> {
        let mut tx = self.pool.begin().await?;

        for item in items {
            let category = CategoryRepository::get_or_create(&mut tx, &item.category).await?;
            let subcategory =
                SubcategoryRepository::get_or_create(&mut tx, category.id, &item.subcategory).await?;

            sqlx::query(
                r#"
                INSERT INTO items (category_id, subcategory_id, price, description,
                                   description_translations, private_data, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(category.id)
            .bind(subcategory.id)
            .bind(item.price)
            .bind(&item.description.base)
            .bind(Json(&item.description.translations))
            .bind(&item.private_data)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(count = items.len(), "Imported items stored");
        Ok(items.len())
    }
}
