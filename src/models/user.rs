//! User model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Who an inbound interaction comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    pub telegram_id: i64,
    pub username: Option<String>,
}

impl UserIdentity {
    pub fn new(telegram_id: i64, username: Option<String>) -> Self {
        Self { telegram_id, username }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub language: Option<String>,
    pub currency: Option<String>,
    /// Spendable balance in the base currency
    pub balance: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persisted display preference of a user
///
/// Either part may be unset; unset parts resolve to the configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Preference {
    pub language: Option<String>,
    pub currency: Option<String>,
}

impl Preference {
    pub fn language(code: impl Into<String>) -> Self {
        Self {
            language: Some(code.into()),
            currency: None,
        }
    }

    pub fn currency(code: impl Into<String>) -> Self {
        Self {
            language: None,
            currency: Some(code.into()),
        }
    }
}
