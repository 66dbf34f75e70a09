//! Services module
//!
//! This module contains business logic services

pub mod currency;
pub mod import;
pub mod notification;

// Re-export commonly used services
pub use currency::CurrencyService;
pub use import::{ImportFormat, ItemImportService};
pub use notification::{Delivery, FailureReport, NotificationService, OperatorNotifier};

use std::sync::Arc;

use crate::config::settings::Settings;
use teloxide::Bot;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub currency_service: Arc<CurrencyService>,
    pub import_service: Arc<ItemImportService>,
    pub notifier: Arc<dyn OperatorNotifier>,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(bot: Bot, settings: &Settings) -> Self {
        let notifier = NotificationService::new(bot, settings.bot.admin_ids.clone());
        Self::with_notifier(settings, Arc::new(notifier))
    }

    /// Build the services around a custom operator notifier
    pub fn with_notifier(settings: &Settings, notifier: Arc<dyn OperatorNotifier>) -> Self {
        Self {
            currency_service: Arc::new(CurrencyService::new(&settings.currency)),
            import_service: Arc::new(ItemImportService::new(settings.i18n.default_language.clone())),
            notifier,
        }
    }
}
