//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub i18n: I18nConfig,
    pub currency: CurrencyConfig,
    pub shop: ShopConfig,
    pub throttle: ThrottleConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    /// Override of the Bot API base URL, used by tests and local API servers
    pub api_url: Option<String>,
    pub admin_ids: Vec<i64>,
    pub support_link: String,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Internationalization configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct I18nConfig {
    pub default_language: String,
    pub supported_languages: Vec<String>,
    /// Directory holding one `<code>.json` bundle per supported language
    pub bundles_dir: String,
}

/// Display currency configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CurrencyConfig {
    /// Currency item prices and balances are stored in
    pub base_currency: String,
    pub default_currency: String,
    pub supported_currencies: Vec<String>,
    /// Units of each currency per one unit of the base currency
    pub rates: HashMap<String, f64>,
}

/// Shop behaviour configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopConfig {
    pub page_entries: u32,
    pub max_quantity: u16,
}

/// Per-user request throttling
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThrottleConfig {
    pub requests_per_minute: u32,
    pub burst: u32,
    pub admin_exempt: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub json: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;
        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("SHOPBOT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("bot.admin_ids")
                    .with_list_parse_key("i18n.supported_languages")
                    .with_list_parse_key("currency.supported_currencies")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::ShopError> {
        super::validation::validate_settings(self)
    }

    pub fn is_admin(&self, telegram_id: i64) -> bool {
        self.bot.admin_ids.contains(&telegram_id)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                api_url: None,
                admin_ids: vec![],
                support_link: "https://t.me/".to_string(),
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/shopbot".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            i18n: I18nConfig {
                default_language: "en".to_string(),
                supported_languages: vec!["en".to_string(), "de".to_string(), "ru".to_string()],
                bundles_dir: "l10n".to_string(),
            },
            currency: CurrencyConfig {
                base_currency: "USD".to_string(),
                default_currency: "USD".to_string(),
                supported_currencies: vec!["USD".to_string(), "EUR".to_string(), "RUB".to_string()],
                rates: HashMap::from([
                    ("USD".to_string(), 1.0),
                    ("EUR".to_string(), 0.92),
                    ("RUB".to_string(), 90.0),
                ]),
            },
            shop: ShopConfig {
                page_entries: 8,
                max_quantity: 10,
            },
            throttle: ThrottleConfig {
                requests_per_minute: 30,
                burst: 10,
                admin_exempt: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: "logs".to_string(),
                json: false,
            },
        }
    }
}
