//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod catalog;
pub mod cart;
pub mod purchase;

// Re-export commonly used models
pub use user::{User, UserIdentity, Preference};
pub use catalog::{Category, Subcategory, Offer, Item, NewItem, LocalizedText, Translations, localized};
pub use cart::{CartLine, CheckoutOutcome, PurchaseReceipt, PurchasedItem};
pub use purchase::{PurchaseSummary, PurchaseDetail};

/// One page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub entries: Vec<T>,
    /// Zero-based index of this page
    pub page: u16,
    /// Zero-based index of the last page
    pub max_page: u16,
}

impl<T> Page<T> {
    pub fn new(entries: Vec<T>, page: u16, max_page: u16) -> Self {
        Self { entries, page, max_page }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page < self.max_page
    }
}
