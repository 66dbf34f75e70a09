//! ShopBot Telegram Bot
//!
//! A Telegram shop: catalog browsing, cart and checkout, purchase history,
//! per-user language and currency, and admin catalog import. Inline buttons
//! carry their navigation state in compact tokens, so no conversation state is
//! kept between interactions.

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod navigation;
pub mod i18n;
pub mod utils;
pub mod middleware;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{ShopError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;
pub use handlers::{InteractionPipeline, ShopContext};
pub use i18n::I18n;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
