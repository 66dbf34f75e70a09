//! Operator notification service
//!
//! Unexpected failures are reported to every configured admin with full
//! diagnostics. Reports too long for one Telegram message are sent as a text
//! document instead.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use teloxide::prelude::*;
use teloxide::types::InputFile;
use tracing::{debug, warn};

use crate::models::UserIdentity;
use crate::utils::errors::{Result, ShopError};

/// Longest text Telegram accepts in one message
pub const MESSAGE_LIMIT: usize = 4096;

/// Receives diagnostics of failures users only see as a generic screen
#[async_trait]
pub trait OperatorNotifier: Send + Sync {
    async fn notify(&self, report: &FailureReport) -> Result<()>;
}

/// Diagnostics of one failed interaction
#[derive(Debug, Clone)]
pub struct FailureReport {
    pub occurred_at: DateTime<Utc>,
    pub telegram_id: i64,
    pub username: Option<String>,
    /// What the user sent, as seen by the bot
    pub input: String,
    pub error: String,
    /// Debug rendering of the error chain
    pub details: String,
}

impl FailureReport {
    pub fn new(identity: &UserIdentity, input: impl Into<String>, error: &ShopError) -> Self {
        Self {
            occurred_at: Utc::now(),
            telegram_id: identity.telegram_id,
            username: identity.username.clone(),
            input: input.into(),
            error: error.to_string(),
            details: format!("{:#?}", error),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "Unexpected failure at {}\nuser: {} (@{})\ninput: {}\nerror: {}\n\n{}",
            self.occurred_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.telegram_id,
            self.username.as_deref().unwrap_or("-"),
            self.input,
            self.error,
            self.details,
        )
    }
}

/// How a rendered report is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Message,
    Document,
}

impl Delivery {
    pub fn for_text(text: &str) -> Self {
        if text.chars().count() > MESSAGE_LIMIT {
            Delivery::Document
        } else {
            Delivery::Message
        }
    }
}

/// Telegram implementation messaging every admin id
#[derive(Clone)]
pub struct NotificationService {
    bot: Bot,
    admin_ids: Vec<i64>,
}

impl NotificationService {
    pub fn new(bot: Bot, admin_ids: Vec<i64>) -> Self {
        Self { bot, admin_ids }
    }

    async fn deliver(&self, chat_id: ChatId, text: &str) -> Result<()> {
        match Delivery::for_text(text) {
            Delivery::Message => {
                self.bot.send_message(chat_id, text).await?;
            }
            Delivery::Document => {
                let file = InputFile::memory(text.as_bytes().to_vec()).file_name("failure_report.txt");
                self.bot.send_document(chat_id, file).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl OperatorNotifier for NotificationService {
    async fn notify(&self, report: &FailureReport) -> Result<()> {
        if self.admin_ids.is_empty() {
            warn!("No admin IDs configured for failure reports");
            return Ok(());
        }

        let text = report.render();
        let mut last_error = None;
        let mut delivered = 0;

        for &admin_id in &self.admin_ids {
            match self.deliver(ChatId(admin_id), &text).await {
                Ok(()) => {
                    debug!(admin_id, "Failure report sent");
                    delivered += 1;
                }
                Err(e) => {
                    warn!(admin_id, error = %e, "Failed to send failure report");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if delivered == 0 => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_switches_to_document_above_limit() {
        assert_eq!(Delivery::for_text("short"), Delivery::Message);
        assert_eq!(Delivery::for_text(&"x".repeat(MESSAGE_LIMIT)), Delivery::Message);
        assert_eq!(Delivery::for_text(&"x".repeat(MESSAGE_LIMIT + 1)), Delivery::Document);
        assert_eq!(Delivery::for_text(&"ä".repeat(MESSAGE_LIMIT)), Delivery::Message);
    }

    #[test]
    fn test_report_carries_diagnostics() {
        let identity = UserIdentity::new(7, Some("buyer".to_string()));
        let error = ShopError::Import("line 3: invalid price".to_string());
        let text = FailureReport::new(&identity, "callback 1k3_______0000_", &error).render();

        assert!(text.contains("user: 7 (@buyer)"));
        assert!(text.contains("input: callback 1k3_______0000_"));
        assert!(text.contains("line 3: invalid price"));
        assert!(text.contains("Import("));
    }
}
