//! Locale bundle loader and lookup
//!
//! Bundles live in `<bundles_dir>/<code>.json`, one per configured language.
//! Each bundle holds the screen groups `common`, `user` and `admin`, addressed
//! with dotted keys such as `user.cart.empty`.

use std::collections::HashMap;
use std::path::Path;
use serde_json::{Value, Map};
use tokio::fs;
use tracing::{info, warn, debug};
use crate::utils::errors::{ShopError, Result};
use crate::config::I18nConfig;

/// Screen groups every bundle must define
pub const SCREEN_GROUPS: [&str; 3] = ["common", "user", "admin"];

/// Loaded locale bundles
#[derive(Debug, Clone)]
pub struct I18n {
    /// Loaded bundles by language code
    translations: HashMap<String, Map<String, Value>>,
    /// Default language code
    default_language: String,
    /// Installed language codes, in configured order
    supported_languages: Vec<String>,
}

/// Translation parameters for message formatting
pub type TranslationParams = HashMap<String, String>;

impl I18n {
    /// Load the bundle of every configured language
    ///
    /// A missing or malformed bundle is fatal: a language the bot offers must
    /// be renderable.
    pub async fn load(config: &I18nConfig) -> Result<Self> {
        let bundles_dir = Path::new(&config.bundles_dir);
        let mut translations = HashMap::new();

        for lang_code in &config.supported_languages {
            let file_path = bundles_dir.join(format!("{}.json", lang_code));
            let content = fs::read_to_string(&file_path).await.map_err(|e| {
                ShopError::Config(format!(
                    "Locale bundle {} could not be read: {}",
                    file_path.display(),
                    e
                ))
            })?;
            let bundle = parse_bundle(lang_code, &content)?;
            debug!("Loaded {} translation keys for {}", count_keys(&bundle), lang_code);
            translations.insert(lang_code.clone(), bundle);
        }

        info!(languages = ?config.supported_languages, "Locale bundles loaded");
        Self::from_bundles(config, translations)
    }

    /// Build from already parsed bundles
    pub fn from_bundles(
        config: &I18nConfig,
        translations: HashMap<String, Map<String, Value>>,
    ) -> Result<Self> {
        if let Some(missing) = config
            .supported_languages
            .iter()
            .find(|code| !translations.contains_key(*code))
        {
            return Err(ShopError::Config(format!(
                "No locale bundle for configured language {}",
                missing
            )));
        }

        Ok(Self {
            translations,
            default_language: config.default_language.clone(),
            supported_languages: config.supported_languages.clone(),
        })
    }

    /// Raw template for `key`, falling back to the default language
    pub fn lookup(&self, key: &str, lang: &str) -> Option<String> {
        let effective_lang = self.get_effective_language(lang);

        self.get_translation_value(key, effective_lang)
            .or_else(|| {
                if effective_lang != self.default_language {
                    self.get_translation_value(key, &self.default_language)
                } else {
                    None
                }
            })
            .map(|value| self.extract_text_from_value(value))
    }

    /// Get a translated message
    ///
    /// Falls back to the default language, then to the key itself.
    pub fn t(&self, key: &str, lang: &str, params: Option<&TranslationParams>) -> String {
        match self.lookup(key, lang) {
            Some(text) => self.format_message(&text, params),
            None => {
                warn!("Translation key '{}' not found in any language", key);
                key.to_string()
            }
        }
    }

    /// Translate with `{name}` placeholders taken from `(name, value)` pairs
    pub fn format(&self, key: &str, lang: &str, params: &[(&str, String)]) -> String {
        let params: TranslationParams = params
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        self.t(key, lang, Some(&params))
    }

    /// Get a translated message with pluralization support
    pub fn tp(&self, key: &str, lang: &str, count: i64, params: Option<&TranslationParams>) -> String {
        let effective_lang = self.get_effective_language(lang);
        let plural_key = format!("{}.{}", key, plural_form(count, effective_lang));

        let mut final_params = params.cloned().unwrap_or_default();
        final_params.insert("count".to_string(), count.to_string());

        self.t(&plural_key, effective_lang, Some(&final_params))
    }

    /// Installed language codes in configured order
    pub fn installed_languages(&self) -> &[String] {
        &self.supported_languages
    }

    /// Get default language
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Display name of a language, taken from its own bundle
    pub fn language_name(&self, lang: &str) -> String {
        self.get_translation_value("common.language_name", lang)
            .map(|value| self.extract_text_from_value(value))
            .unwrap_or_else(|| lang.to_string())
    }

    fn get_effective_language<'a>(&'a self, lang: &'a str) -> &'a str {
        if self.translations.contains_key(lang) {
            lang
        } else {
            &self.default_language
        }
    }

    /// Walk a dotted key through the nested bundle
    fn get_translation_value(&self, key: &str, lang: &str) -> Option<&Value> {
        let translations = self.translations.get(lang)?;
        let mut parts = key.split('.');
        let mut current = translations.get(parts.next()?)?;

        for part in parts {
            current = current.get(part)?;
        }

        Some(current)
    }

    /// Extract text from JSON value (handle both strings and objects with pluralization)
    fn extract_text_from_value(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Object(obj) => {
                if let Some(other) = obj.get("other") {
                    self.extract_text_from_value(other)
                } else if let Some((_, first_value)) = obj.iter().next() {
                    self.extract_text_from_value(first_value)
                } else {
                    String::new()
                }
            }
            _ => value.to_string(),
        }
    }

    /// Format message with parameters
    fn format_message(&self, template: &str, params: Option<&TranslationParams>) -> String {
        match params {
            Some(params) => params.iter().fold(template.to_string(), |text, (key, value)| {
                text.replace(&format!("{{{}}}", key), value)
            }),
            None => template.to_string(),
        }
    }
}

/// Parse and check one bundle file
pub fn parse_bundle(lang_code: &str, content: &str) -> Result<Map<String, Value>> {
    let bundle = match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            return Err(ShopError::Config(format!(
                "Locale bundle for {} must be a JSON object",
                lang_code
            )))
        }
        Err(e) => {
            return Err(ShopError::Config(format!(
                "Locale bundle for {} is malformed: {}",
                lang_code, e
            )))
        }
    };

    if let Some(group) = SCREEN_GROUPS
        .iter()
        .find(|group| !matches!(bundle.get(**group), Some(Value::Object(_))))
    {
        return Err(ShopError::Config(format!(
            "Locale bundle for {} lacks the {} group",
            lang_code, group
        )));
    }

    Ok(bundle)
}

/// Determine plural form based on language-specific rules
fn plural_form(count: i64, lang: &str) -> &'static str {
    match lang {
        "ru" => {
            let abs_count = count.abs();
            let last_digit = abs_count % 10;
            let last_two_digits = abs_count % 100;

            if last_digit == 1 && last_two_digits != 11 {
                "one"
            } else if (2..=4).contains(&last_digit) && !(12..=14).contains(&last_two_digits) {
                "few"
            } else {
                "many"
            }
        }
        _ => {
            if count == 1 { "one" } else { "other" }
        }
    }
}

fn count_keys(obj: &Map<String, Value>) -> usize {
    obj.values()
        .map(|value| match value {
            Value::Object(nested) => count_keys(nested),
            _ => 1,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn create_test_config() -> I18nConfig {
        I18nConfig {
            default_language: "en".to_string(),
            supported_languages: vec!["en".to_string(), "ru".to_string()],
            bundles_dir: "l10n".to_string(),
        }
    }

    fn bundle(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn create_test_i18n() -> I18n {
        let translations = HashMap::from([
            (
                "en".to_string(),
                bundle(json!({
                    "common": {"language_name": "English", "back": "Back"},
                    "user": {
                        "greeting": "Hello {name}",
                        "stock": {"one": "{count} item", "other": "{count} items"},
                        "only_en": "Only English"
                    },
                    "admin": {}
                })),
            ),
            (
                "ru".to_string(),
                bundle(json!({
                    "common": {"language_name": "Русский", "back": "Назад"},
                    "user": {
                        "greeting": "Привет, {name}",
                        "stock": {"one": "{count} товар", "few": "{count} товара", "many": "{count} товаров"}
                    },
                    "admin": {}
                })),
            ),
        ]);
        I18n::from_bundles(&create_test_config(), translations).unwrap()
    }

    #[test]
    fn test_plural_form_english() {
        assert_eq!(plural_form(0, "en"), "other");
        assert_eq!(plural_form(1, "en"), "one");
        assert_eq!(plural_form(2, "en"), "other");
    }

    #[test]
    fn test_plural_form_russian() {
        assert_eq!(plural_form(1, "ru"), "one");
        assert_eq!(plural_form(2, "ru"), "few");
        assert_eq!(plural_form(5, "ru"), "many");
        assert_eq!(plural_form(11, "ru"), "many");
        assert_eq!(plural_form(21, "ru"), "one");
    }

    #[test]
    fn test_lookup_and_fallbacks() {
        let i18n = create_test_i18n();

        assert_eq!(i18n.t("common.back", "ru", None), "Назад");
        assert_eq!(i18n.t("user.only_en", "ru", None), "Only English");
        assert_eq!(i18n.t("common.back", "fr", None), "Back");
        assert_eq!(i18n.t("user.missing", "en", None), "user.missing");
    }

    #[test]
    fn test_message_formatting() {
        let i18n = create_test_i18n();

        assert_eq!(
            i18n.format("user.greeting", "ru", &[("name", "Иван".to_string())]),
            "Привет, Иван"
        );
        assert_eq!(i18n.tp("user.stock", "ru", 3, None), "3 товара");
        assert_eq!(i18n.tp("user.stock", "en", 1, None), "1 item");
    }

    #[test]
    fn test_language_names() {
        let i18n = create_test_i18n();

        assert_eq!(i18n.language_name("ru"), "Русский");
        assert_eq!(i18n.installed_languages(), ["en", "ru"]);
    }

    #[test]
    fn test_missing_bundle_is_fatal() {
        let translations = HashMap::from([(
            "en".to_string(),
            bundle(json!({"common": {}, "user": {}, "admin": {}})),
        )]);
        assert_matches!(
            I18n::from_bundles(&create_test_config(), translations),
            Err(ShopError::Config(_))
        );
    }

    #[test]
    fn test_bundle_must_carry_every_group() {
        assert_matches!(parse_bundle("en", r#"{"common": {}, "user": {}}"#), Err(ShopError::Config(_)));
        assert_matches!(parse_bundle("en", "[1, 2]"), Err(ShopError::Config(_)));
        assert_matches!(parse_bundle("en", "{"), Err(ShopError::Config(_)));
        assert!(parse_bundle("en", r#"{"common": {}, "user": {}, "admin": {}}"#).is_ok());
    }

    #[tokio::test]
    async fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"{"common": {"language_name": "English"}, "user": {}, "admin": {}}"#;
        std::fs::write(dir.path().join("en.json"), body).unwrap();

        let mut config = create_test_config();
        config.bundles_dir = dir.path().to_string_lossy().into_owned();
        assert_matches!(I18n::load(&config).await, Err(ShopError::Config(_)));

        config.supported_languages = vec!["en".to_string()];
        let i18n = I18n::load(&config).await.unwrap();
        assert_eq!(i18n.language_name("en"), "English");
    }
}
