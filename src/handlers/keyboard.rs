//! Rendering screens as Telegram messages

use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, MessageId,
};
use teloxide::{ApiError, RequestError};
use tracing::{debug, warn};
use url::Url;

use crate::navigation::{ButtonTarget, Screen};
use crate::utils::errors::Result;

/// Inline keyboard of a screen, if it has any buttons
pub fn inline_markup(screen: &Screen) -> Result<Option<InlineKeyboardMarkup>> {
    if screen.rows.is_empty() {
        return Ok(None);
    }

    let rows = screen
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| match &button.target {
                    ButtonTarget::Callback(token) => Ok(InlineKeyboardButton::callback(
                        button.label.clone(),
                        token.as_str().to_string(),
                    )),
                    ButtonTarget::Url(link) => {
                        Ok(InlineKeyboardButton::url(button.label.clone(), Url::parse(link)?))
                    }
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(InlineKeyboardMarkup::new(rows)))
}

/// Persistent reply keyboard with the main menu labels
pub fn menu_markup(menu: &[Vec<String>]) -> KeyboardMarkup {
    let rows = menu
        .iter()
        .map(|row| row.iter().map(|label| KeyboardButton::new(label.clone())).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    KeyboardMarkup::new(rows).resize_keyboard()
}

/// Send a screen as a new message
///
/// Telegram allows one markup per message: a screen with a menu installs the
/// reply keyboard, otherwise its inline rows are attached.
pub async fn send_screen(bot: &Bot, chat_id: ChatId, screen: &Screen) -> Result<()> {
    let request = bot.send_message(chat_id, screen.text.clone());

    match (&screen.menu, inline_markup(screen)?) {
        (Some(menu), inline) => {
            if inline.is_some() {
                warn!(chat_id = chat_id.0, "Inline buttons dropped in favour of the main menu");
            }
            request.reply_markup(menu_markup(menu)).await?;
        }
        (None, Some(inline)) => {
            request.reply_markup(inline).await?;
        }
        (None, None) => {
            request.await?;
        }
    }

    Ok(())
}

/// Replace the text and inline keyboard of an existing message
pub async fn edit_screen(bot: &Bot, chat_id: ChatId, message_id: MessageId, screen: &Screen) -> Result<()> {
    let mut request = bot.edit_message_text(chat_id, message_id, screen.text.clone());
    if let Some(inline) = inline_markup(screen)? {
        request = request.reply_markup(inline);
    }

    match request.await {
        Ok(_) => Ok(()),
        Err(RequestError::Api(ApiError::MessageNotModified)) => {
            debug!(chat_id = chat_id.0, "Message already shows this screen");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
