//! Bot handlers module
//!
//! Screen handlers for every navigation kind, the transport-neutral
//! interaction pipeline, and the Telegram endpoints feeding it:
//! - Command handlers for bot commands
//! - Callback handlers for inline keyboard interactions
//! - Message handlers for text and uploaded documents

pub mod context;
pub mod pagination;
pub mod catalog;
pub mod cart;
pub mod profile;
pub mod preferences;
pub mod admin;
pub mod pipeline;
pub mod keyboard;

pub mod commands;
pub mod callbacks;
pub mod messages;

pub use context::{ScreenContext, ShopContext};
pub use pipeline::{Input, Interaction, InteractionPipeline, Reply};
pub use commands::{handle_command, Command};
pub use callbacks::handle_callback_query;
pub use messages::handle_message;

use futures::future::BoxFuture;

use crate::models::UserIdentity;
use crate::navigation::{NavKind, NavigationAction, NavigationRouter, RoutingError, Screen};
use crate::utils::errors::Result;

/// One step of a navigation flow
pub type LevelHandler =
    for<'a> fn(&'a NavigationAction, &'a ScreenContext) -> BoxFuture<'a, Result<Screen>>;

pub type ShopRouter = NavigationRouter<LevelHandler>;

/// Register the level tables of every navigation kind
pub fn build_router() -> std::result::Result<ShopRouter, RoutingError> {
    NavigationRouter::builder()
        .flow(NavKind::Catalog, catalog::flow())
        .flow(NavKind::Cart, cart::flow())
        .flow(NavKind::Profile, profile::flow())
        .flow(NavKind::Language, preferences::language_flow())
        .flow(NavKind::Currency, preferences::currency_flow())
        .flow(NavKind::Admin, admin::flow())
        .build()
}

/// Identity of the Telegram user behind an update
pub fn identity_of(user: &teloxide::types::User) -> UserIdentity {
    UserIdentity::new(user.id.0 as i64, user.username.clone())
}
