//! User repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::user::{Preference, User, UserIdentity};
use crate::utils::errors::ShopError;

const USER_COLUMNS: &str =
    "id, telegram_id, username, language, currency, balance, created_at, updated_at";

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the user if unknown, refreshing the username otherwise
    pub async fn upsert(&self, identity: &UserIdentity) -> Result<User, ShopError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (telegram_id, username, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT (telegram_id) DO UPDATE
            SET username = COALESCE(EXCLUDED.username, users.username)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(identity.telegram_id)
        .bind(&identity.username)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by Telegram ID
    pub async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, ShopError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE telegram_id = $1"
        ))
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_preference(&self, telegram_id: i64) -> Result<Preference, ShopError> {
        let preference = sqlx::query_as::<_, Preference>(
            "SELECT language, currency FROM users WHERE telegram_id = $1",
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(preference.unwrap_or_default())
    }

    /// Store the set parts of a preference, registering the user if needed
    pub async fn set_preference(
        &self,
        identity: &UserIdentity,
        preference: &Preference,
    ) -> Result<(), ShopError> {
        sqlx::query(
            r#"
            INSERT INTO users (telegram_id, username, language, currency, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT (telegram_id) DO UPDATE
            SET language = COALESCE($3, users.language),
                currency = COALESCE($4, users.currency),
                updated_at = $5
            "#,
        )
        .bind(identity.telegram_id)
        .bind(&identity.username)
        .bind(&preference.language)
        .bind(&preference.currency)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
