//! Cart and checkout flow
//!
//! 0 cart contents, 1 delete a line, 2 checkout summary, 3 purchase.

use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::models::{CartLine, CheckoutOutcome, PurchaseReceipt, PurchasedItem};
use crate::navigation::{Button, NavArgs, NavKind, NavigationAction, Screen};
use crate::utils::errors::{Result, ShopError};
use crate::utils::logging::log_user_action;
use super::context::{required_id, token_id, ScreenContext};
use super::LevelHandler;

pub fn flow() -> Vec<(u8, LevelHandler)> {
    vec![
        (0, show_cart as LevelHandler),
        (1, delete_line as LevelHandler),
        (2, checkout_summary as LevelHandler),
        (3, purchase as LevelHandler),
    ]
}

fn step(level: u8, args: NavArgs) -> NavigationAction {
    NavigationAction::new(NavKind::Cart, level, args)
}

fn empty_cart(ctx: &ScreenContext) -> Result<Screen> {
    Ok(Screen::new(ctx.t("user.cart.empty")).row(vec![Button::navigate(
        ctx.t("common.menu.catalog"),
        &NavigationAction::entry(NavKind::Catalog),
    )?]))
}

fn line_text(ctx: &ScreenContext, line: &CartLine) -> String {
    ctx.format(
        "user.cart.line",
        &[
            ("name", line.display_name(ctx.language()).to_string()),
            ("quantity", line.quantity.to_string()),
            ("total", ctx.price(line.total())),
        ],
    )
}

/// Private data of purchased items, one block per item
pub(crate) fn items_text(ctx: &ScreenContext, items: &[PurchasedItem]) -> String {
    items
        .iter()
        .map(|item| {
            ctx.format(
                "user.cart.item",
                &[
                    ("description", item.display_description(ctx.language()).to_string()),
                    ("private_data", item.private_data.clone()),
                ],
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn show_cart<'a>(_action: &'a NavigationAction, ctx: &'a ScreenContext) -> BoxFuture<'a, Result<Screen>> {
    Box::pin(async move {
        let lines = ctx.store().cart(ctx.telegram_id()).await?;
        if lines.is_empty() {
            return empty_cart(ctx);
        }

        let mut text = ctx.t("user.cart.title");
        for line in &lines {
            text.push('\n');
            text.push_str(&line_text(ctx, line));
        }

        let delete_buttons = lines
            .iter()
            .map(|line| {
                let label = ctx.format(
                    "user.cart.delete_button",
                    &[
                        ("name", line.display_name(ctx.language()).to_string()),
                        ("quantity", line.quantity.to_string()),
                    ],
                );
                Ok(Button::navigate(label, &step(1, NavArgs::target(token_id(line.id)?)))?)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Screen::new(text)
            .column(delete_buttons)
            .row(vec![Button::navigate(
                ctx.t("user.cart.checkout_button"),
                &step(2, NavArgs::default()),
            )?]))
    })
}

fn delete_line<'a>(action: &'a NavigationAction, ctx: &'a ScreenContext) -> BoxFuture<'a, Result<Screen>> {
    Box::pin(async move {
        let line_id = required_id(action.args.target_id, "target_id")?;
        let removed = ctx.store().remove_cart_line(ctx.telegram_id(), line_id).await?;
        if removed {
            log_user_action(ctx.telegram_id(), "remove_cart_line", None);
        } else {
            debug!(user_id = ctx.telegram_id(), line_id, "Cart line already gone");
        }

        show_cart(&NavigationAction::entry(NavKind::Cart), ctx).await
    })
}

fn checkout_summary<'a>(_action: &'a NavigationAction, ctx: &'a ScreenContext) -> BoxFuture<'a, Result<Screen>> {
    Box::pin(async move {
        let lines = ctx.store().cart(ctx.telegram_id()).await?;
        if lines.is_empty() {
            return empty_cart(ctx);
        }

        let user = ctx
            .store()
            .find_user(ctx.telegram_id())
            .await?
            .ok_or(ShopError::UserNotFound { telegram_id: ctx.telegram_id() })?;

        let total: f64 = lines.iter().map(CartLine::total).sum();
        let summary = lines
            .iter()
            .map(|line| line_text(ctx, line))
            .collect::<Vec<_>>()
            .join("\n");

        let text = ctx.format(
            "user.cart.summary",
            &[
                ("lines", summary),
                ("total", ctx.price(total)),
                ("balance", ctx.price(user.balance)),
            ],
        );

        Ok(Screen::new(text).row(vec![
            Button::navigate(
                ctx.t("common.confirm"),
                &step(3, NavArgs::default().with_confirmation(true)),
            )?,
            Button::navigate(ctx.t("common.cancel"), &step(0, NavArgs::default()))?,
        ]))
    })
}

fn purchase<'a>(action: &'a NavigationAction, ctx: &'a ScreenContext) -> BoxFuture<'a, Result<Screen>> {
    Box::pin(async move {
        if action.args.confirmation != Some(true) {
            return show_cart(&NavigationAction::entry(NavKind::Cart), ctx).await;
        }

        let back_to_cart = || ctx.back_to(NavKind::Cart);

        match ctx.store().checkout(ctx.telegram_id()).await? {
            CheckoutOutcome::Purchased(receipt) => {
                info!(
                    user_id = ctx.telegram_id(),
                    purchase_id = receipt.purchase_id,
                    total = receipt.total,
                    items = receipt.items.len(),
                    "Purchase completed"
                );
                log_user_action(ctx.telegram_id(), "purchase", None);
                purchased(ctx, &receipt)
            }
            CheckoutOutcome::InsufficientBalance { required, balance } => {
                info!(user_id = ctx.telegram_id(), required, balance, "Checkout refused: balance");
                let text = ctx.format(
                    "user.cart.insufficient_balance",
                    &[("required", ctx.price(required)), ("balance", ctx.price(balance))],
                );
                Ok(Screen::new(text).row(vec![back_to_cart()?]))
            }
            CheckoutOutcome::OutOfStock { subcategory } => {
                warn!(user_id = ctx.telegram_id(), subcategory = %subcategory, "Checkout refused: stock");
                let text = ctx.format("user.cart.out_of_stock", &[("name", subcategory)]);
                Ok(Screen::new(text).row(vec![back_to_cart()?]))
            }
            CheckoutOutcome::EmptyCart => empty_cart(ctx),
        }
    })
}

fn purchased(ctx: &ScreenContext, receipt: &PurchaseReceipt) -> Result<Screen> {
    let text = ctx.format(
        "user.cart.purchased",
        &[
            ("id", receipt.purchase_id.to_string()),
            ("total", ctx.price(receipt.total)),
            ("balance", ctx.price(receipt.balance_left)),
            ("items", items_text(ctx, &receipt.items)),
        ],
    );

    Ok(Screen::new(text).row(vec![Button::navigate(
        ctx.t("user.profile.history_button"),
        &NavigationAction::new(NavKind::Profile, 1, NavArgs::default()),
    )?]))
}
