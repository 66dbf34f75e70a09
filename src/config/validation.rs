//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::navigation::codec::is_valid_code;
use crate::utils::errors::{Result, ShopError};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_database_config(&settings.database)?;
    validate_i18n_config(&settings.i18n)?;
    validate_currency_config(&settings.currency)?;
    validate_shop_config(&settings.shop)?;
    validate_throttle_config(&settings.throttle)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(ShopError::Config("Bot token is required".to_string()));
    }

    if config.admin_ids.is_empty() {
        return Err(ShopError::Config(
            "At least one admin ID must be configured".to_string(),
        ));
    }

    url::Url::parse(&config.support_link)
        .map_err(|e| ShopError::Config(format!("Invalid support link: {}", e)))?;

    if let Some(api_url) = &config.api_url {
        url::Url::parse(api_url)
            .map_err(|e| ShopError::Config(format!("Invalid Bot API URL: {}", e)))?;
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(ShopError::Config("Database URL is required".to_string()));
    }

    if config.max_connections == 0 {
        return Err(ShopError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(ShopError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

/// Validate internationalization configuration
fn validate_i18n_config(config: &super::I18nConfig) -> Result<()> {
    if config.default_language.is_empty() {
        return Err(ShopError::Config("Default language is required".to_string()));
    }

    if config.supported_languages.is_empty() {
        return Err(ShopError::Config(
            "At least one supported language is required".to_string(),
        ));
    }

    if !config.supported_languages.contains(&config.default_language) {
        return Err(ShopError::Config(
            "Default language must be in supported languages list".to_string(),
        ));
    }

    // Language codes travel inside callback tokens
    if let Some(code) = config.supported_languages.iter().find(|code| !is_valid_code(code)) {
        return Err(ShopError::Config(format!(
            "Language code {:?} must be 1-5 characters of [A-Za-z0-9-]",
            code
        )));
    }

    Ok(())
}

/// Validate currency configuration
fn validate_currency_config(config: &super::CurrencyConfig) -> Result<()> {
    if config.supported_currencies.is_empty() {
        return Err(ShopError::Config(
            "At least one supported currency is required".to_string(),
        ));
    }

    if !config.supported_currencies.contains(&config.default_currency) {
        return Err(ShopError::Config(
            "Default currency must be in supported currencies list".to_string(),
        ));
    }

    if let Some(code) = config.supported_currencies.iter().find(|code| !is_valid_code(code)) {
        return Err(ShopError::Config(format!(
            "Currency code {:?} must be 1-5 characters of [A-Za-z0-9-]",
            code
        )));
    }

    if let Some((code, rate)) = config.rates.iter().find(|(_, rate)| !(**rate > 0.0 && rate.is_finite())) {
        return Err(ShopError::Config(format!(
            "Exchange rate for {} must be a positive number, got {}",
            code, rate
        )));
    }

    Ok(())
}

/// Validate shop configuration
fn validate_shop_config(config: &super::ShopConfig) -> Result<()> {
    if config.page_entries == 0 {
        return Err(ShopError::Config(
            "Page entries must be greater than 0".to_string(),
        ));
    }

    if config.max_quantity == 0 {
        return Err(ShopError::Config(
            "Max quantity must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate throttle configuration
fn validate_throttle_config(config: &super::ThrottleConfig) -> Result<()> {
    if config.requests_per_minute == 0 {
        return Err(ShopError::Config(
            "Requests per minute must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(ShopError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(ShopError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}
