//! Internationalization module
//!
//! This module handles multi-language support for the shop bot: locale bundle
//! loading, message formatting, pluralization, and the per-interaction
//! language and currency resolution.

pub mod context;
pub mod loader;

// Re-export commonly used i18n components
pub use context::{LocaleResolver, RequestContext, Resolution, ResolutionFallback};
pub use loader::{I18n, TranslationParams};
