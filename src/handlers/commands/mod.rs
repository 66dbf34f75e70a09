//! Command handlers module
//!
//! Bot commands are thin entry points into the interaction pipeline.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message, utils::command::BotCommands};
use tracing::debug;

use crate::utils::errors::{Result, ShopError};
use super::keyboard::send_screen;
use super::pipeline::{Input, Interaction, InteractionPipeline};
use super::identity_of;

/// All available bot commands
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "ShopBot commands:")]
pub enum Command {
    #[command(description = "Choose a language and open the shop")]
    Start,
    #[command(description = "Show the main menu")]
    Help,
}

/// Main command dispatcher
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    pipeline: Arc<InteractionPipeline>,
) -> Result<()> {
    let user = msg
        .from
        .as_ref()
        .ok_or_else(|| ShopError::InvalidInput("No user in message".to_string()))?;
    debug!(user_id = user.id.0, command = ?cmd, "Processing command");

    let reply = pipeline
        .handle(Interaction::new(identity_of(user), Input::Command(cmd)))
        .await;
    send_screen(&bot, msg.chat.id, &reply.screen).await
}
