//! Display currency conversion
//!
//! Prices and balances are stored in the base currency and converted with
//! static configured rates when rendered.

use std::collections::HashMap;

use tracing::warn;

use crate::config::CurrencyConfig;
use crate::i18n::{I18n, RequestContext};
use crate::utils::errors::{Result, ShopError};

#[derive(Debug, Clone)]
pub struct CurrencyService {
    base_currency: String,
    /// Units per one unit of the base currency, keyed by upper-case code
    rates: HashMap<String, f64>,
}

impl CurrencyService {
    pub fn new(config: &CurrencyConfig) -> Self {
        let rates = config
            .rates
            .iter()
            .map(|(code, rate)| (code.to_uppercase(), *rate))
            .collect();

        Self {
            base_currency: config.base_currency.to_uppercase(),
            rates,
        }
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    fn rate(&self, code: &str) -> Option<f64> {
        if code.eq_ignore_ascii_case(&self.base_currency) {
            return Some(1.0);
        }
        self.rates.get(&code.to_uppercase()).copied()
    }

    /// Convert a base-currency amount into `to`
    pub fn convert(&self, amount: f64, to: &str) -> Result<f64> {
        self.rate(to)
            .map(|rate| amount * rate)
            .ok_or_else(|| ShopError::MissingRate {
                from: self.base_currency.clone(),
                to: to.to_string(),
            })
    }

    /// Render a base-currency amount in the interaction's currency
    ///
    /// Without a rate the amount is shown unconverted with the base currency's
    /// symbol, never relabelled.
    pub fn format_price(&self, amount: f64, request: &RequestContext, i18n: &I18n) -> String {
        let (value, code) = match self.convert(amount, &request.currency) {
            Ok(value) => (value, request.currency.as_str()),
            Err(e) => {
                warn!(error = %e, currency = %request.currency, "Showing price in base currency");
                (amount, self.base_currency.as_str())
            }
        };

        let symbol = i18n
            .lookup(&format!("common.currency.{}", code), &request.language)
            .unwrap_or_else(|| code.to_string());

        i18n.format(
            "common.price",
            &request.language,
            &[("amount", format!("{:.2}", value)), ("symbol", symbol)],
        )
    }
}
