//! Message handlers module
//!
//! Text messages go through the interaction pipeline, where reply-keyboard
//! labels are matched. Documents sent by admins are catalog uploads.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use teloxide::net::Download;
use teloxide::types::Document;
use teloxide::{prelude::*, types::Message};
use tokio::fs::File;
use tracing::{debug, info};

use crate::models::UserIdentity;
use crate::utils::errors::{Result, ShopError};
use crate::utils::helpers::{generate_uuid, sanitize_filename};
use super::keyboard::send_screen;
use super::pipeline::{Input, Interaction, InteractionPipeline, Reply};
use super::identity_of;

/// Handle incoming messages
pub async fn handle_message(bot: Bot, msg: Message, pipeline: Arc<InteractionPipeline>) -> Result<()> {
    let user = msg
        .from
        .as_ref()
        .ok_or_else(|| ShopError::InvalidInput("No user in message".to_string()))?;
    let chat_id = msg.chat.id;

    if !chat_id.is_user() {
        debug!(chat_id = ?chat_id, "Ignoring message outside a private chat");
        return Ok(());
    }

    let identity = identity_of(user);

    let reply = match msg.document() {
        Some(document) if pipeline.is_admin(identity.telegram_id) => {
            handle_upload(&bot, identity, document, &pipeline).await
        }
        _ => {
            let text = msg.text().or(msg.caption()).unwrap_or_default().to_string();
            pipeline.handle(Interaction::new(identity, Input::Text(text))).await
        }
    };

    send_screen(&bot, chat_id, &reply.screen).await
}

async fn handle_upload(
    bot: &Bot,
    identity: UserIdentity,
    document: &Document,
    pipeline: &InteractionPipeline,
) -> Reply {
    let file_name = document.file_name.clone().unwrap_or_default();
    let path = upload_path(&file_name);
    info!(
        admin_id = identity.telegram_id,
        file = %file_name,
        size = document.file.size,
        "Receiving catalog upload"
    );

    match download(bot, document, &path).await {
        Ok(()) => pipeline.ingest_items(identity, &file_name, &path).await,
        Err(e) => {
            if let Err(remove) = tokio::fs::remove_file(&path).await {
                debug!(path = %path.display(), error = %remove, "No partial upload to remove");
            }
            pipeline
                .report_failure(identity, &format!("document {}", file_name), e)
                .await
        }
    }
}

/// Unique temporary location for an uploaded file
fn upload_path(file_name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}_{}", generate_uuid(), sanitize_filename(file_name)))
}

async fn download(bot: &Bot, document: &Document, path: &Path) -> Result<()> {
    let file = bot.get_file(document.file.id.clone()).await?;
    let mut destination = File::create(path).await?;
    bot.download_file(&file.path, &mut destination).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_path_is_unique_and_sanitized() {
        let first = upload_path("../items.json");
        let second = upload_path("../items.json");

        assert_ne!(first, second);
        assert_eq!(first.parent(), Some(std::env::temp_dir().as_path()));
        let name = first.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.ends_with("items.json"));
        assert!(!name.contains('/'));
    }
}
