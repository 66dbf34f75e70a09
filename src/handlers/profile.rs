//! Profile flow
//!
//! 0 profile overview, 1 purchase history, 2 one purchase.

use futures::future::BoxFuture;

use crate::navigation::{Button, NavArgs, NavKind, NavigationAction, Screen};
use crate::utils::errors::{Result, ShopError};
use crate::utils::helpers::format_timestamp;
use super::cart::items_text;
use super::context::{required_id, token_id, ScreenContext};
use super::pagination::{page_caption, page_row};
use super::LevelHandler;

pub fn flow() -> Vec<(u8, LevelHandler)> {
    vec![
        (0, overview as LevelHandler),
        (1, history as LevelHandler),
        (2, purchase as LevelHandler),
    ]
}

fn step(level: u8, args: NavArgs) -> NavigationAction {
    NavigationAction::new(NavKind::Profile, level, args)
}

fn overview<'a>(_action: &'a NavigationAction, ctx: &'a ScreenContext) -> BoxFuture<'a, Result<Screen>> {
    Box::pin(async move {
        let user = ctx
            .store()
            .find_user(ctx.telegram_id())
            .await?
            .ok_or(ShopError::UserNotFound { telegram_id: ctx.telegram_id() })?;

        let text = ctx.format(
            "user.profile.overview",
            &[
                ("telegram_id", user.telegram_id.to_string()),
                ("balance", ctx.price(user.balance)),
            ],
        );

        Ok(Screen::new(text)
            .row(vec![Button::navigate(
                ctx.t("user.profile.history_button"),
                &step(1, NavArgs::default()),
            )?])
            .row(vec![
                Button::navigate(
                    ctx.t("user.profile.language_button"),
                    &NavigationAction::entry(NavKind::Language),
                )?,
                Button::navigate(
                    ctx.t("user.profile.currency_button"),
                    &NavigationAction::entry(NavKind::Currency),
                )?,
            ]))
    })
}

fn history<'a>(action: &'a NavigationAction, ctx: &'a ScreenContext) -> BoxFuture<'a, Result<Screen>> {
    Box::pin(async move {
        let page = ctx
            .store()
            .purchases(ctx.telegram_id(), action.page(), ctx.shop.shop.page_entries)
            .await?;

        if page.is_empty() {
            return Ok(Screen::new(ctx.t("user.profile.no_purchases"))
                .row(vec![ctx.back_to(NavKind::Profile)?]));
        }

        let buttons = page
            .entries
            .iter()
            .map(|summary| {
                let label = ctx.format(
                    "user.profile.purchase_button",
                    &[
                        ("id", summary.id.to_string()),
                        ("date", format_timestamp(summary.created_at)),
                        ("total", ctx.price(summary.total_price)),
                    ],
                );
                let args = NavArgs::target(token_id(summary.id)?).with_page(page.page);
                Ok(Button::navigate(label, &step(2, args))?)
            })
            .collect::<Result<Vec<_>>>()?;

        let text = format!("{}{}", ctx.t("user.profile.history"), page_caption(ctx, &page));
        Ok(Screen::new(text)
            .column(buttons)
            .row(page_row(ctx, &page, |p| step(1, NavArgs::page(p)))?)
            .row(vec![ctx.back_to(NavKind::Profile)?]))
    })
}

fn purchase<'a>(action: &'a NavigationAction, ctx: &'a ScreenContext) -> BoxFuture<'a, Result<Screen>> {
    Box::pin(async move {
        let purchase_id = required_id(action.args.target_id, "target_id")?;
        let detail = ctx
            .store()
            .purchase(ctx.telegram_id(), purchase_id)
            .await?
            .ok_or(ShopError::PurchaseNotFound { purchase_id })?;

        let text = ctx.format(
            "user.profile.purchase",
            &[
                ("id", detail.summary.id.to_string()),
                ("date", format_timestamp(detail.summary.created_at)),
                ("quantity", detail.summary.quantity.to_string()),
                ("total", ctx.price(detail.summary.total_price)),
                ("items", items_text(ctx, &detail.items)),
            ],
        );

        Ok(Screen::new(text).row(vec![ctx.back(&step(1, NavArgs::page(action.page())))?]))
    })
}
