//! Per-interaction locale and currency
//!
//! Every inbound interaction resolves one [`RequestContext`] before any screen
//! is rendered. The value is owned by the interaction and handed by reference
//! to every text lookup and price format, so concurrent interactions never
//! observe each other's language or currency.

use thiserror::Error;
use tracing::debug;

use crate::config::CurrencyConfig;
use crate::database::store::PreferenceStore;
use crate::models::{Preference, UserIdentity};
use super::I18n;

/// Display language and currency of one interaction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestContext {
    pub language: String,
    pub currency: String,
}

impl RequestContext {
    pub fn new(language: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            currency: currency.into(),
        }
    }

    /// Same context in another language
    pub fn with_language(&self, language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            currency: self.currency.clone(),
        }
    }

    /// Same context in another currency
    pub fn with_currency(&self, currency: impl Into<String>) -> Self {
        Self {
            language: self.language.clone(),
            currency: currency.into(),
        }
    }
}

/// Why resolution fell back to the configured defaults
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionFallback {
    #[error("preference store unavailable: {0}")]
    StoreUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub context: RequestContext,
    /// Set when defaults were used because the stored preference could not be read
    pub fallback: Option<ResolutionFallback>,
}

/// Turns persisted preferences into a [`RequestContext`]
#[derive(Debug, Clone)]
pub struct LocaleResolver {
    default_language: String,
    installed_languages: Vec<String>,
    default_currency: String,
    supported_currencies: Vec<String>,
}

impl LocaleResolver {
    pub fn new(i18n: &I18n, currency: &CurrencyConfig) -> Self {
        Self {
            default_language: i18n.default_language().to_string(),
            installed_languages: i18n.installed_languages().to_vec(),
            default_currency: currency.default_currency.clone(),
            supported_currencies: currency.supported_currencies.clone(),
        }
    }

    /// The defaults, used for users without a usable preference
    pub fn default_context(&self) -> RequestContext {
        RequestContext::new(self.default_language.clone(), self.default_currency.clone())
    }

    pub fn is_installed_language(&self, code: &str) -> bool {
        self.installed_languages.iter().any(|language| language == code)
    }

    pub fn is_supported_currency(&self, code: &str) -> bool {
        self.supported_currencies.iter().any(|currency| currency == code)
    }

    /// Apply the resolution rule to an already loaded preference
    ///
    /// Each part is used when set and still offered, otherwise its default.
    pub fn resolve_preference(&self, preference: Option<&Preference>) -> RequestContext {
        let language = preference
            .and_then(|p| p.language.as_deref())
            .filter(|code| {
                let installed = self.is_installed_language(code);
                if !installed {
                    debug!(language = code, "Stored language is not installed");
                }
                installed
            })
            .unwrap_or(self.default_language.as_str());

        let currency = preference
            .and_then(|p| p.currency.as_deref())
            .filter(|code| {
                let supported = self.is_supported_currency(code);
                if !supported {
                    debug!(currency = code, "Stored currency is not supported");
                }
                supported
            })
            .unwrap_or(self.default_currency.as_str());

        RequestContext::new(language, currency)
    }

    /// Resolve the context of an interaction from its stored preference
    ///
    /// Never fails: a store error yields the defaults plus a fallback reason.
    pub async fn resolve<S>(&self, identity: &UserIdentity, store: &S) -> Resolution
    where
        S: PreferenceStore + ?Sized,
    {
        match store.get_preference(identity).await {
            Ok(preference) => Resolution {
                context: self.resolve_preference(Some(&preference)),
                fallback: None,
            },
            Err(e) => Resolution {
                context: self.resolve_preference(None),
                fallback: Some(ResolutionFallback::StoreUnavailable(e.to_string())),
            },
        }
    }
}
