//! Subcategory repository implementation

use sqlx::types::Json;
use sqlx::PgConnection;
use crate::models::catalog::{LocalizedText, Subcategory};
use crate::utils::errors::ShopError;

/// Subcategories are only written while importing, inside the import transaction
#[derive(Debug, Clone, Copy, Default)]
pub struct SubcategoryRepository;

impl SubcategoryRepository {
    /// Get a subcategory of `category_id` by base name, creating it or merging
    /// new translations
    pub async fn get_or_create(
        conn: &mut PgConnection,
        category_id: i32,
        name: &LocalizedText,
    ) -> Result<Subcategory, ShopError> {
        let subcategory = sqlx::query_as::<_, Subcategory>(
            r#"
            INSERT INTO subcategories (category_id, name, translations)
            VALUES ($1, $2, $3)
            ON CONFLICT (category_id, name) DO UPDATE
            SET translations = subcategories.translations || EXCLUDED.translations
            RETURNING id, category_id, name, translations
            "#,
        )
        .bind(category_id)
        .bind(&name.base)
        .bind(Json(&name.translations))
        .fetch_one(&mut *conn)
        .await?;

        Ok(subcategory)
    }
}
