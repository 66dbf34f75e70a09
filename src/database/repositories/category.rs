//! Category repository implementation

use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use crate::models::catalog::{Category, LocalizedText};
use crate::models::Page;
use crate::utils::errors::ShopError;
use crate::utils::helpers::{calculate_offset, max_page};

#[derive(Clone)]
#[derive(Debug)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Categories holding at least one unsold item, by name
    pub async fn page_in_stock(&self, page: u16, page_size: u32) -> Result<Page<Category>, ShopError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM categories c
            WHERE EXISTS (SELECT 1 FROM items i WHERE i.category_id = c.id AND NOT i.is_sold)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        let last = max_page(total, page_size);
        let page = page.min(last);

        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.id, c.name, c.translations FROM categories c
            WHERE EXISTS (SELECT 1 FROM items i WHERE i.category_id = c.id AND NOT i.is_sold)
            ORDER BY c.name, c.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(page_size))
        .bind(calculate_offset(page, page_size))
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(categories, page, last))
    }

    /// Find category by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Category>, ShopError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, translations FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Get a category by base name, creating it or merging new translations
    pub async fn get_or_create(conn: &mut PgConnection, name: &LocalizedText) -> Result<Category, ShopError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, translations)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE
            SET translations = categories.translations || EXCLUDED.translations
            RETURNING id, name, translations
            "#,
        )
        .bind(&name.base)
        .bind(Json(&name.translations))
        .fetch_one(&mut *conn)
        .await?;

        Ok(category)
    }
}
