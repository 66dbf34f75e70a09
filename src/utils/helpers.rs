//! Helper functions and utilities
//! 
//! This module contains common helper functions used throughout the application.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new UUID v4
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Calculate pagination offset for a zero-based page
pub fn calculate_offset(page: u16, page_size: u32) -> i64 {
    i64::from(page) * i64::from(page_size)
}

/// Index of the last zero-based page holding `total` entries
pub fn max_page(total: i64, page_size: u32) -> u16 {
    if total <= 0 || page_size == 0 {
        return 0;
    }
    let last = (total - 1) / i64::from(page_size);
    u16::try_from(last).unwrap_or(u16::MAX)
}

/// Amount in whole cents, the unit checkout compares and subtracts in
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Sanitize filename for safe storage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello world", 8), "hello...");
        assert_eq!(truncate_text("Überweisung", 6), "Übe...");
    }

    #[test]
    fn test_pagination() {
        assert_eq!(calculate_offset(0, 8), 0);
        assert_eq!(calculate_offset(3, 8), 24);
        assert_eq!(max_page(0, 8), 0);
        assert_eq!(max_page(8, 8), 0);
        assert_eq!(max_page(9, 8), 1);
        assert_eq!(max_page(17, 8), 2);
    }

    #[test]
    fn test_cents() {
        assert_eq!(to_cents(0.1) + to_cents(0.2), to_cents(0.3));
        assert_eq!(to_cents(19.999), 2000);
        assert_eq!(to_cents(-1.005), -100);
        assert_eq!(from_cents(to_cents(0.3) - to_cents(0.1) - to_cents(0.2)), 0.0);
        assert_eq!(from_cents(1840), 18.4);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("items (1).json"), "items__1_.json");
        assert_eq!(sanitize_filename("../etc/passwd"), ".._etc_passwd");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  🛒  Cart \n"), "🛒 Cart");
    }
}
