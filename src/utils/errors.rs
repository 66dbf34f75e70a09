//! Error handling for ShopBot
//!
//! This module defines the main error type used throughout the application
//! and its classification into recoverable and operator-facing failures.

use thiserror::Error;

use crate::navigation::{DecodeError, EncodeError, RoutingError};

/// Main error type for ShopBot
#[derive(Error, Debug)]
pub enum ShopError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Telegram file download error: {0}")]
    Download(#[from] teloxide::DownloadError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Navigation token error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Navigation encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Navigation routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User not found: {telegram_id}")]
    UserNotFound { telegram_id: i64 },

    #[error("Category not found: {category_id}")]
    CategoryNotFound { category_id: i32 },

    #[error("No offer for category {category_id}, subcategory {subcategory_id}")]
    OfferNotFound { category_id: i32, subcategory_id: i32 },

    #[error("Purchase not found: {purchase_id}")]
    PurchaseNotFound { purchase_id: i32 },

    #[error("No exchange rate from {from} to {to}")]
    MissingRate { from: String, to: String },

    #[error("Item import failed: {0}")]
    Import(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for ShopBot operations
pub type Result<T> = std::result::Result<T, ShopError>;

impl ShopError {
    /// Whether the user can be shown a specific screen for this error instead of
    /// the generic failure message
    pub fn is_recoverable(&self) -> bool {
        match self {
            ShopError::Database(_) => false,
            ShopError::Migration(_) => false,
            ShopError::Telegram(_) => true,
            ShopError::Download(_) => true,
            ShopError::Config(_) => false,
            ShopError::Decode(_) => true,
            ShopError::Encode(_) => false,
            ShopError::Routing(_) => false,
            ShopError::PermissionDenied(_) => true,
            ShopError::UserNotFound { .. } => false,
            ShopError::CategoryNotFound { .. } => true,
            ShopError::OfferNotFound { .. } => true,
            ShopError::PurchaseNotFound { .. } => true,
            ShopError::MissingRate { .. } => true,
            ShopError::Import(_) => true,
            ShopError::Serialization(_) => false,
            ShopError::Io(_) => false,
            ShopError::UrlParse(_) => false,
            ShopError::RateLimitExceeded => true,
            ShopError::InvalidInput(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ShopError::Database(_) => ErrorSeverity::Critical,
            ShopError::Migration(_) => ErrorSeverity::Critical,
            ShopError::Config(_) => ErrorSeverity::Critical,
            ShopError::Routing(_) => ErrorSeverity::Critical,
            ShopError::Encode(_) => ErrorSeverity::Error,
            ShopError::Decode(_) => ErrorSeverity::Info,
            ShopError::PermissionDenied(_) => ErrorSeverity::Warning,
            ShopError::RateLimitExceeded => ErrorSeverity::Warning,
            ShopError::MissingRate { .. } => ErrorSeverity::Warning,
            ShopError::InvalidInput(_) => ErrorSeverity::Info,
            ShopError::CategoryNotFound { .. }
            | ShopError::OfferNotFound { .. }
            | ShopError::PurchaseNotFound { .. } => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Whether operators should receive a report for this error
    pub fn needs_operator(&self) -> bool {
        !self.is_recoverable() || self.severity() >= ErrorSeverity::Error
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NavKind;

    #[test]
    fn test_routing_errors_reach_operators() {
        let error = ShopError::from(RoutingError::UnknownLevel { kind: NavKind::Cart, level: 9 });
        assert!(!error.is_recoverable());
        assert_eq!(error.severity(), ErrorSeverity::Critical);
        assert!(error.needs_operator());
    }

    #[test]
    fn test_user_errors_stay_local() {
        assert!(!ShopError::from(DecodeError::Empty).needs_operator());
        assert!(!ShopError::PermissionDenied("admin".into()).needs_operator());
        assert!(!ShopError::InvalidInput("qty".into()).needs_operator());
        assert!(ShopError::Import("bad line".into()).is_recoverable());
    }
}
