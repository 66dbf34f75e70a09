//! Catalog flow
//!
//! 0 categories, 1 subcategories of a category, 2 quantity picker,
//! 3 confirmation, 4 add to cart (or back to the subcategories on cancel).

use futures::future::BoxFuture;
use tracing::info;

use crate::navigation::{Button, NavArgs, NavKind, NavigationAction, Screen};
use crate::utils::errors::{Result, ShopError};
use crate::utils::logging::log_user_action;
use super::context::{required_id, token_id, ScreenContext};
use super::pagination::{page_caption, page_row};
use super::LevelHandler;

const QUANTITY_COLUMNS: usize = 5;

pub fn flow() -> Vec<(u8, LevelHandler)> {
    vec![
        (0, categories as LevelHandler),
        (1, subcategories as LevelHandler),
        (2, quantity as LevelHandler),
        (3, confirm as LevelHandler),
        (4, commit as LevelHandler),
    ]
}

fn step(level: u8, args: NavArgs) -> NavigationAction {
    NavigationAction::new(NavKind::Catalog, level, args)
}

fn categories<'a>(action: &'a NavigationAction, ctx: &'a ScreenContext) -> BoxFuture<'a, Result<Screen>> {
    Box::pin(async move {
        let page = ctx
            .store()
            .categories(action.page(), ctx.shop.shop.page_entries)
            .await?;

        if page.is_empty() {
            return Ok(Screen::new(ctx.t("user.catalog.empty")));
        }

        let buttons = page
            .entries
            .iter()
            .map(|category| {
                let target = step(1, NavArgs::category(token_id(category.id)?));
                Ok(Button::navigate(category.display_name(ctx.language()), &target)?)
            })
            .collect::<Result<Vec<_>>>()?;

        let text = format!("{}{}", ctx.t("user.catalog.categories"), page_caption(ctx, &page));
        Ok(Screen::new(text)
            .column(buttons)
            .row(page_row(ctx, &page, |p| step(0, NavArgs::page(p)))?))
    })
}

fn subcategories<'a>(action: &'a NavigationAction, ctx: &'a ScreenContext) -> BoxFuture<'a, Result<Screen>> {
    Box::pin(async move {
        let category_id = required_id(action.args.category_id, "category_id")?;
        let category = ctx
            .store()
            .category(category_id)
            .await?
            .ok_or(ShopError::CategoryNotFound { category_id })?;

        let page = ctx
            .store()
            .offers(category_id, action.page(), ctx.shop.shop.page_entries)
            .await?;
        let category_arg = token_id(category_id)?;

        let buttons = page
            .entries
            .iter()
            .map(|offer| {
                let label = ctx.format(
                    "user.catalog.offer_button",
                    &[
                        ("name", offer.display_name(ctx.language()).to_string()),
                        ("price", ctx.price(offer.price)),
                        ("stock", ctx.plural("user.catalog.stock", offer.available)),
                    ],
                );
                let args = NavArgs::category(category_arg).with_subcategory(token_id(offer.subcategory_id)?);
                Ok(Button::navigate(label, &step(2, args))?)
            })
            .collect::<Result<Vec<_>>>()?;

        let key = if page.is_empty() {
            "user.catalog.sold_out"
        } else {
            "user.catalog.subcategories"
        };
        let text = format!(
            "{}{}",
            ctx.format(key, &[("category", category.display_name(ctx.language()).to_string())]),
            page_caption(ctx, &page)
        );

        Ok(Screen::new(text)
            .column(buttons)
            .row(page_row(ctx, &page, |p| {
                step(1, NavArgs::category(category_arg).with_page(p))
            })?)
            .row(vec![ctx.back_to(NavKind::Catalog)?]))
    })
}

fn quantity<'a>(action: &'a NavigationAction, ctx: &'a ScreenContext) -> BoxFuture<'a, Result<Screen>> {
    Box::pin(async move {
        let category_id = required_id(action.args.category_id, "category_id")?;
        let subcategory_id = required_id(action.args.subcategory_id, "subcategory_id")?;
        let offer = ctx
            .store()
            .offer(category_id, subcategory_id)
            .await?
            .ok_or(ShopError::OfferNotFound { category_id, subcategory_id })?;

        let max = i64::from(ctx.shop.shop.max_quantity).min(offer.available);
        let base = NavArgs::category(token_id(category_id)?).with_subcategory(token_id(subcategory_id)?);
        let buttons = (1..=max)
            .map(|quantity| {
                let args = base.clone().with_quantity(quantity as u16);
                Ok(Button::navigate(quantity.to_string(), &step(3, args))?)
            })
            .collect::<Result<Vec<_>>>()?;

        let text = ctx.format(
            "user.catalog.quantity",
            &[
                ("name", offer.display_name(ctx.language()).to_string()),
                ("description", offer.display_description(ctx.language()).to_string()),
                ("price", ctx.price(offer.price)),
                ("available", offer.available.to_string()),
            ],
        );

        Ok(Screen::new(text)
            .grid(buttons, QUANTITY_COLUMNS)
            .row(vec![ctx.back(&step(1, NavArgs::category(token_id(category_id)?)))?]))
    })
}

fn confirm<'a>(action: &'a NavigationAction, ctx: &'a ScreenContext) -> BoxFuture<'a, Result<Screen>> {
    Box::pin(async move {
        let category_id = required_id(action.args.category_id, "category_id")?;
        let subcategory_id = required_id(action.args.subcategory_id, "subcategory_id")?;
        let quantity = action
            .args
            .quantity
            .filter(|q| *q > 0)
            .ok_or_else(|| ShopError::InvalidInput("missing quantity".to_string()))?;
        let offer = ctx
            .store()
            .offer(category_id, subcategory_id)
            .await?
            .ok_or(ShopError::OfferNotFound { category_id, subcategory_id })?;

        let base = NavArgs::category(token_id(category_id)?).with_subcategory(token_id(subcategory_id)?);
        let back = ctx.back(&step(2, base.clone()))?;

        if i64::from(quantity) > offer.available {
            let text = ctx.format(
                "user.catalog.not_enough_stock",
                &[("available", offer.available.to_string())],
            );
            return Ok(Screen::new(text).row(vec![back]));
        }

        let text = ctx.format(
            "user.catalog.confirm",
            &[
                ("quantity", quantity.to_string()),
                ("name", offer.display_name(ctx.language()).to_string()),
                ("total", ctx.price(offer.price * f64::from(quantity))),
            ],
        );
        let chosen = base.with_quantity(quantity);

        Ok(Screen::new(text)
            .row(vec![
                Button::navigate(
                    ctx.t("common.confirm"),
                    &step(4, chosen.clone().with_confirmation(true)),
                )?,
                Button::navigate(
                    ctx.t("common.cancel"),
                    &step(4, chosen.with_confirmation(false)),
                )?,
            ])
            .row(vec![back]))
    })
}

fn commit<'a>(action: &'a NavigationAction, ctx: &'a ScreenContext) -> BoxFuture<'a, Result<Screen>> {
    Box::pin(async move {
        let category_id = required_id(action.args.category_id, "category_id")?;

        if action.args.confirmation != Some(true) {
            let back = step(1, NavArgs::category(token_id(category_id)?));
            return subcategories(&back, ctx).await;
        }

        let subcategory_id = required_id(action.args.subcategory_id, "subcategory_id")?;
        let quantity = action
            .args
            .quantity
            .filter(|q| *q > 0)
            .ok_or_else(|| ShopError::InvalidInput("missing quantity".to_string()))?;
        let offer = ctx
            .store()
            .offer(category_id, subcategory_id)
            .await?
            .ok_or(ShopError::OfferNotFound { category_id, subcategory_id })?;

        ctx.store()
            .add_to_cart(ctx.telegram_id(), category_id, subcategory_id, i32::from(quantity))
            .await?;
        info!(
            user_id = ctx.telegram_id(),
            category_id,
            subcategory_id,
            quantity,
            "Added to cart"
        );
        log_user_action(ctx.telegram_id(), "add_to_cart", Some(&offer.name));

        let text = ctx.format(
            "user.catalog.added",
            &[
                ("quantity", quantity.to_string()),
                ("name", offer.display_name(ctx.language()).to_string()),
            ],
        );
        Ok(Screen::new(text).row(vec![
            Button::navigate(ctx.t("user.catalog.go_to_cart"), &NavigationAction::entry(NavKind::Cart))?,
            Button::navigate(ctx.t("user.catalog.continue"), &NavigationAction::entry(NavKind::Catalog))?,
        ]))
    })
}
