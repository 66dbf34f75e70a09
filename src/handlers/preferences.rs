//! Language and currency selection
//!
//! Both flows list the choices at level 0 and persist the chosen code at
//! level 1. The confirmation is rendered under a fresh request context
//! carrying the new choice.

use futures::future::BoxFuture;
use tracing::info;

use crate::models::Preference;
use crate::navigation::{Button, NavArgs, NavKind, NavigationAction, Screen};
use crate::utils::errors::{Result, ShopError};
use crate::utils::logging::log_user_action;
use super::context::ScreenContext;
use super::LevelHandler;

pub fn language_flow() -> Vec<(u8, LevelHandler)> {
    vec![
        (0, languages as LevelHandler),
        (1, select_language as LevelHandler),
    ]
}

pub fn currency_flow() -> Vec<(u8, LevelHandler)> {
    vec![
        (0, currencies as LevelHandler),
        (1, select_currency as LevelHandler),
    ]
}

/// Greeting with the persistent main menu
pub fn start_screen(ctx: &ScreenContext) -> Screen {
    let name = ctx
        .identity
        .username
        .clone()
        .unwrap_or_else(|| ctx.telegram_id().to_string());

    Screen::new(ctx.format("common.start_message", &[("name", name)])).with_menu(ctx.main_menu())
}

fn selected_code(action: &NavigationAction) -> Result<&str> {
    action
        .args
        .code
        .as_deref()
        .ok_or_else(|| ShopError::InvalidInput("missing code".to_string()))
}

fn languages<'a>(_action: &'a NavigationAction, ctx: &'a ScreenContext) -> BoxFuture<'a, Result<Screen>> {
    Box::pin(async move {
        let i18n = &ctx.shop.i18n;
        let buttons = i18n
            .installed_languages()
            .iter()
            .map(|code| {
                let mut label = i18n.language_name(code);
                if code == ctx.language() {
                    label = format!("✓ {}", label);
                }
                let target = NavigationAction::new(NavKind::Language, 1, NavArgs::code(code.as_str()));
                Ok(Button::navigate(label, &target)?)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Screen::new(ctx.t("user.language.choose")).column(buttons))
    })
}

fn select_language<'a>(action: &'a NavigationAction, ctx: &'a ScreenContext) -> BoxFuture<'a, Result<Screen>> {
    Box::pin(async move {
        let code = selected_code(action)?;
        if !ctx.shop.resolver.is_installed_language(code) {
            return Err(ShopError::InvalidInput(format!("language {} is not installed", code)));
        }

        ctx.store()
            .set_preference(&ctx.identity, &Preference::language(code))
            .await?;
        info!(user_id = ctx.telegram_id(), language = code, "Language changed");
        log_user_action(ctx.telegram_id(), "set_language", Some(code));

        let updated = ctx.with_request(ctx.request.with_language(code));
        let mut screen = start_screen(&updated);
        screen.text = format!(
            "{}\n\n{}",
            updated.format("user.language.changed", &[("language", ctx.shop.i18n.language_name(code))]),
            screen.text
        );
        Ok(screen.with_context(updated.request))
    })
}

fn currency_label(ctx: &ScreenContext, code: &str) -> String {
    match ctx.shop.i18n.lookup(&format!("common.currency.{}", code), ctx.language()) {
        Some(symbol) if symbol != code => format!("{} ({})", code, symbol),
        _ => code.to_string(),
    }
}

fn currencies<'a>(_action: &'a NavigationAction, ctx: &'a ScreenContext) -> BoxFuture<'a, Result<Screen>> {
    Box::pin(async move {
        let buttons = ctx
            .shop
            .supported_currencies
            .iter()
            .map(|code| {
                let mut label = currency_label(ctx, code);
                if code == &ctx.request.currency {
                    label = format!("✓ {}", label);
                }
                let target = NavigationAction::new(NavKind::Currency, 1, NavArgs::code(code.as_str()));
                Ok(Button::navigate(label, &target)?)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Screen::new(ctx.t("user.currency.choose"))
            .column(buttons)
            .row(vec![ctx.back_to(NavKind::Profile)?]))
    })
}

fn select_currency<'a>(action: &'a NavigationAction, ctx: &'a ScreenContext) -> BoxFuture<'a, Result<Screen>> {
    Box::pin(async move {
        let code = selected_code(action)?;
        if !ctx.shop.resolver.is_supported_currency(code) {
            return Err(ShopError::InvalidInput(format!("currency {} is not supported", code)));
        }

        ctx.store()
            .set_preference(&ctx.identity, &Preference::currency(code))
            .await?;
        info!(user_id = ctx.telegram_id(), currency = code, "Currency changed");
        log_user_action(ctx.telegram_id(), "set_currency", Some(code));

        let updated = ctx.with_request(ctx.request.with_currency(code));
        let user = updated
            .store()
            .find_user(updated.telegram_id())
            .await?
            .ok_or(ShopError::UserNotFound { telegram_id: updated.telegram_id() })?;

        let text = updated.format(
            "user.currency.changed",
            &[
                ("currency", currency_label(&updated, code)),
                ("balance", updated.price(user.balance)),
            ],
        );
        Ok(Screen::new(text)
            .row(vec![updated.back_to(NavKind::Profile)?])
            .with_context(updated.request))
    })
}
