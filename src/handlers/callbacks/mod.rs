//! Callback query handlers module
//!
//! Every inline button carries a navigation token; pressing it re-renders the
//! originating message with the screen the token leads to.

use std::sync::Arc;

use teloxide::{prelude::*, types::{CallbackQuery, ChatId}};
use tracing::{debug, warn};

use crate::utils::errors::Result;
use super::keyboard::{edit_screen, send_screen};
use super::pipeline::{Input, Interaction, InteractionPipeline};
use super::identity_of;

/// Main callback query dispatcher
pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    pipeline: Arc<InteractionPipeline>,
) -> Result<()> {
    let user_id = query.from.id.0 as i64;

    // Answer first so the client stops showing the loading state
    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
        warn!(error = %e, callback_id = %query.id, "Failed to answer callback query");
    }

    let Some(data) = query.data.clone() else {
        debug!(user_id, "Callback query without data");
        return Ok(());
    };
    debug!(user_id, callback_data = %data, "Processing callback query");

    let reply = pipeline
        .handle(Interaction::new(identity_of(&query.from), Input::Callback(data)))
        .await;

    match &query.message {
        // A reply keyboard can only be installed by a new message
        Some(message) if reply.screen.menu.is_none() => {
            edit_screen(&bot, message.chat().id, message.id(), &reply.screen).await
        }
        Some(message) => send_screen(&bot, message.chat().id, &reply.screen).await,
        None => send_screen(&bot, ChatId(user_id), &reply.screen).await,
    }
}
