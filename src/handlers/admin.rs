//! Admin flow
//!
//! 0 admin menu, 1 import instructions for one format. The upload itself
//! arrives as a document message, see `handlers::messages`.

use futures::future::BoxFuture;

use crate::navigation::{Button, NavArgs, NavKind, NavigationAction, Screen};
use crate::utils::errors::{Result, ShopError};
use crate::utils::logging::log_admin_action;
use super::context::ScreenContext;
use super::LevelHandler;

const FORMATS: [&str; 2] = ["json", "txt"];

pub fn flow() -> Vec<(u8, LevelHandler)> {
    vec![
        (0, menu as LevelHandler),
        (1, instructions as LevelHandler),
    ]
}

fn menu<'a>(_action: &'a NavigationAction, ctx: &'a ScreenContext) -> BoxFuture<'a, Result<Screen>> {
    Box::pin(async move {
        ctx.require_admin()?;

        let buttons = FORMATS
            .iter()
            .map(|format| {
                let target = NavigationAction::new(NavKind::Admin, 1, NavArgs::code(*format));
                Ok(Button::navigate(ctx.t(&format!("admin.import.{}_button", format)), &target)?)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Screen::new(ctx.t("admin.menu")).row(buttons))
    })
}

fn instructions<'a>(action: &'a NavigationAction, ctx: &'a ScreenContext) -> BoxFuture<'a, Result<Screen>> {
    Box::pin(async move {
        ctx.require_admin()?;

        let format = action
            .args
            .code
            .as_deref()
            .filter(|code| FORMATS.contains(code))
            .ok_or_else(|| ShopError::InvalidInput("unknown import format".to_string()))?;
        log_admin_action(ctx.telegram_id(), "import_instructions", Some(format), None);

        Ok(Screen::new(ctx.t(&format!("admin.import.{}_instructions", format)))
            .row(vec![ctx.back_to(NavKind::Admin)?]))
    })
}
