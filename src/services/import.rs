//! Catalog import from uploaded files
//!
//! Two formats are accepted. JSON is an array of objects with `category`,
//! `subcategory`, `description`, `price` and `private_data`, where the first
//! three are either a string or a map language -> text. TXT holds one item per
//! line as `category;subcategory;description;price;private_data`, the first
//! three written as `base|lang:text|lang:text`.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tokio::fs;
use tracing::{info, warn};

use crate::database::store::CatalogStore;
use crate::models::{LocalizedText, NewItem};
use crate::utils::errors::{Result, ShopError};

/// Import file format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Txt,
}

impl ImportFormat {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LocalizedField {
    Plain(String),
    Localized(HashMap<String, String>),
}

#[derive(Debug, Deserialize)]
struct JsonItem {
    category: LocalizedField,
    subcategory: LocalizedField,
    description: LocalizedField,
    price: f64,
    private_data: String,
}

#[derive(Debug, Clone)]
pub struct ItemImportService {
    /// Language whose entry is the base value of localized JSON fields
    default_language: String,
}

impl ItemImportService {
    pub fn new(default_language: impl Into<String>) -> Self {
        Self {
            default_language: default_language.into(),
        }
    }

    /// Parse, store and then delete an uploaded file
    ///
    /// The file is removed whether or not the import succeeds.
    pub async fn import_file<S>(&self, path: &Path, format: ImportFormat, store: &S) -> Result<usize>
    where
        S: CatalogStore + ?Sized,
    {
        let result = self.import_contents(path, format, store).await;

        if let Err(e) = fs::remove_file(path).await {
            warn!(path = %path.display(), error = %e, "Failed to delete uploaded import file");
        }

        result
    }

    async fn import_contents<S>(&self, path: &Path, format: ImportFormat, store: &S) -> Result<usize>
    where
        S: CatalogStore + ?Sized,
    {
        let content = fs::read_to_string(path).await?;
        let items = self.parse(format, &content)?;
        let added = store.add_items(items).await?;
        info!(added, ?format, "Catalog import finished");
        Ok(added)
    }

    pub fn parse(&self, format: ImportFormat, content: &str) -> Result<Vec<NewItem>> {
        let items = match format {
            ImportFormat::Json => self.parse_json(content)?,
            ImportFormat::Txt => self.parse_txt(content)?,
        };

        if items.is_empty() {
            return Err(ShopError::Import("the file contains no items".to_string()));
        }
        Ok(items)
    }

    pub fn parse_json(&self, content: &str) -> Result<Vec<NewItem>> {
        let raw: Vec<JsonItem> = serde_json::from_str(content)
            .map_err(|e| ShopError::Import(format!("invalid JSON: {}", e)))?;

        raw.into_iter()
            .enumerate()
            .map(|(index, item)| {
                let position = index + 1;
                Ok(NewItem {
                    category: self.localized(item.category, "category", position)?,
                    subcategory: self.localized(item.subcategory, "subcategory", position)?,
                    description: self.localized(item.description, "description", position)?,
                    price: check_price(item.price, position)?,
                    private_data: check_private_data(&item.private_data, position)?,
                })
            })
            .collect()
    }

    pub fn parse_txt(&self, content: &str) -> Result<Vec<NewItem>> {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| parse_txt_line(line, index + 1))
            .collect()
    }

    fn localized(&self, field: LocalizedField, name: &str, position: usize) -> Result<LocalizedText> {
        let text = match field {
            LocalizedField::Plain(base) => LocalizedText::plain(base.trim()),
            LocalizedField::Localized(mut translations) => {
                let base = translations.remove(&self.default_language).ok_or_else(|| {
                    ShopError::Import(format!(
                        "item {}: {} has no {} entry",
                        position, name, self.default_language
                    ))
                })?;
                LocalizedText {
                    base: base.trim().to_string(),
                    translations,
                }
            }
        };

        if text.base.is_empty() {
            return Err(ShopError::Import(format!("item {}: {} is empty", position, name)));
        }
        Ok(text)
    }
}

fn parse_txt_line(line: &str, line_number: usize) -> Result<NewItem> {
    let fields: Vec<&str> = line.splitn(5, ';').collect();
    let [category, subcategory, description, price, private_data] = fields[..] else {
        return Err(ShopError::Import(format!(
            "line {}: expected 5 fields separated by ';', found {}",
            line_number,
            fields.len()
        )));
    };

    let price: f64 = price
        .trim()
        .parse()
        .map_err(|_| ShopError::Import(format!("line {}: invalid price {:?}", line_number, price)))?;

    Ok(NewItem {
        category: parse_txt_text(category, "category", line_number)?,
        subcategory: parse_txt_text(subcategory, "subcategory", line_number)?,
        description: parse_txt_text(description, "description", line_number)?,
        price: check_price(price, line_number)?,
        private_data: check_private_data(private_data, line_number)?,
    })
}

/// `base|lang:text|lang:text`
fn parse_txt_text(field: &str, name: &str, line_number: usize) -> Result<LocalizedText> {
    let mut parts = field.split('|');
    let base = parts.next().unwrap_or_default().trim();
    if base.is_empty() {
        return Err(ShopError::Import(format!("line {}: {} is empty", line_number, name)));
    }

    parts.try_fold(LocalizedText::plain(base), |text, part| {
        match part.split_once(':') {
            Some((language, translation)) if !language.trim().is_empty() => {
                Ok(text.with_translation(language.trim(), translation.trim()))
            }
            _ => Err(ShopError::Import(format!(
                "line {}: {} translation {:?} must look like lang:text",
                line_number, name, part
            ))),
        }
    })
}

fn check_price(price: f64, position: usize) -> Result<f64> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(ShopError::Import(format!("item {}: price must be positive", position)))
    }
}

fn check_private_data(private_data: &str, position: usize) -> Result<String> {
    let private_data = private_data.trim();
    if private_data.is_empty() {
        return Err(ShopError::Import(format!("item {}: private data is empty", position)));
    }
    Ok(private_data.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn service() -> ItemImportService {
        ItemImportService::new("en")
    }

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(ImportFormat::from_file_name("items.json"), Some(ImportFormat::Json));
        assert_eq!(ImportFormat::from_file_name("ITEMS.TXT"), Some(ImportFormat::Txt));
        assert_eq!(ImportFormat::from_file_name("items.csv"), None);
        assert_eq!(ImportFormat::from_file_name("items"), None);
    }

    #[test]
    fn test_parse_json_plain_and_localized() {
        let content = r#"[
            {"category": "Keys", "subcategory": "Steam", "description": "Game key",
             "price": 4.5, "private_data": "AAAA-BBBB"},
            {"category": {"en": "Keys", "de": "Schlüssel"}, "subcategory": "Steam",
             "description": {"en": "Game key", "de": "Spielschlüssel"},
             "price": 5, "private_data": "CCCC-DDDD"}
        ]"#;

        let items = service().parse(ImportFormat::Json, content).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].category, LocalizedText::plain("Keys"));
        assert_eq!(
            items[1].category,
            LocalizedText::plain("Keys").with_translation("de", "Schlüssel")
        );
        assert_eq!(items[1].price, 5.0);
        assert_eq!(items[1].private_data, "CCCC-DDDD");
    }

    #[test]
    fn test_parse_json_requires_default_language_entry() {
        let content = r#"[{"category": {"de": "Schlüssel"}, "subcategory": "Steam",
            "description": "x", "price": 1, "private_data": "y"}]"#;
        assert_matches!(service().parse_json(content), Err(ShopError::Import(_)));
    }

    #[test]
    fn test_parse_txt() {
        let content = "Keys|de:Schlüssel;Steam;Game key|de:Spielschlüssel;4.50;login;pass;word\n\n\
                       Accounts;Mail;Mailbox;2;user@example.com\n";

        let items = service().parse(ImportFormat::Txt, content).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].category.translations.get("de").map(String::as_str), Some("Schlüssel"));
        assert_eq!(items[0].description.base, "Game key");
        assert_eq!(items[0].price, 4.5);
        assert_eq!(items[0].private_data, "login;pass;word");
        assert_eq!(items[1].subcategory, LocalizedText::plain("Mail"));
    }

    #[test]
    fn test_parse_txt_rejects_bad_lines() {
        let service = service();
        assert_matches!(service.parse_txt("Keys;Steam;Game key;4.50"), Err(ShopError::Import(_)));
        assert_matches!(service.parse_txt("Keys;Steam;Game key;free;x"), Err(ShopError::Import(_)));
        assert_matches!(service.parse_txt("Keys;Steam;Game key;-1;x"), Err(ShopError::Import(_)));
        assert_matches!(service.parse_txt("Keys|de;Steam;Game key;1;x"), Err(ShopError::Import(_)));
        assert_matches!(service.parse_txt(";Steam;Game key;1;x"), Err(ShopError::Import(_)));
    }

    #[test]
    fn test_empty_file_is_an_error() {
        assert_matches!(service().parse(ImportFormat::Txt, "\n \n"), Err(ShopError::Import(_)));
        assert_matches!(service().parse(ImportFormat::Json, "[]"), Err(ShopError::Import(_)));
    }
}
