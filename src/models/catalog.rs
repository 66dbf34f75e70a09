//! Catalog models

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

/// Per-language display texts, keyed by language code
pub type Translations = HashMap<String, String>;

/// Pick the text for `language`, falling back to the base value
pub fn localized<'a>(base: &'a str, translations: &'a Translations, language: &str) -> &'a str {
    translations
        .get(language)
        .map(String::as_str)
        .filter(|text| !text.is_empty())
        .unwrap_or(base)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub translations: Json<Translations>,
}

impl Category {
    pub fn display_name(&self, language: &str) -> &str {
        localized(&self.name, &self.translations, language)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subcategory {
    pub id: i32,
    pub category_id: i32,
    pub name: String,
    pub translations: Json<Translations>,
}

impl Subcategory {
    pub fn display_name(&self, language: &str) -> &str {
        localized(&self.name, &self.translations, language)
    }
}

/// A subcategory as offered for sale inside one category
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Offer {
    pub category_id: i32,
    pub subcategory_id: i32,
    pub name: String,
    pub translations: Json<Translations>,
    /// Unit price in the base currency
    pub price: f64,
    /// Unsold items left
    pub available: i64,
    pub description: String,
    pub description_translations: Json<Translations>,
}

impl Offer {
    pub fn display_name(&self, language: &str) -> &str {
        localized(&self.name, &self.translations, language)
    }

    pub fn display_description(&self, language: &str) -> &str {
        localized(&self.description, &self.description_translations, language)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: i32,
    pub category_id: i32,
    pub subcategory_id: i32,
    pub price: f64,
    pub description: String,
    pub description_translations: Json<Translations>,
    pub private_data: String,
    pub is_sold: bool,
    pub is_new: bool,
    pub created_at: DateTime<Utc>,
}

/// A text with a base value and optional translations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub base: String,
    pub translations: Translations,
}

impl LocalizedText {
    pub fn plain(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            translations: Translations::new(),
        }
    }

    pub fn with_translation(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.translations.insert(language.into(), text.into());
        self
    }
}

/// An item ready to be stored, as produced by catalog import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub category: LocalizedText,
    pub subcategory: LocalizedText,
    pub description: LocalizedText,
    pub price: f64,
    pub private_data: String,
}
