//! Previous/next controls for paged listings

use crate::models::Page;
use crate::navigation::{Button, NavigationAction};
use crate::utils::errors::Result;
use super::context::ScreenContext;

/// Previous/next buttons for `page`, each leading to `to_page(index)`
pub fn page_buttons<T>(
    page: &Page<T>,
    previous_label: &str,
    next_label: &str,
    to_page: impl Fn(u16) -> NavigationAction,
) -> Result<Vec<Button>> {
    let mut row = Vec::with_capacity(2);
    if page.has_previous() {
        row.push(Button::navigate(previous_label, &to_page(page.page - 1))?);
    }
    if page.has_next() {
        row.push(Button::navigate(next_label, &to_page(page.page + 1))?);
    }
    Ok(row)
}

/// Localized pagination row
pub fn page_row<T>(
    ctx: &ScreenContext,
    page: &Page<T>,
    to_page: impl Fn(u16) -> NavigationAction,
) -> Result<Vec<Button>> {
    page_buttons(page, &ctx.t("common.previous"), &ctx.t("common.next"), to_page)
}

/// "Page x/y" suffix for listings spanning more than one page
pub fn page_caption<T>(ctx: &ScreenContext, page: &Page<T>) -> String {
    if page.max_page == 0 {
        return String::new();
    }
    format!(
        "\n\n{}",
        ctx.format(
            "common.page",
            &[
                ("current", (u32::from(page.page) + 1).to_string()),
                ("total", (u32::from(page.max_page) + 1).to_string()),
            ],
        )
    )
}
