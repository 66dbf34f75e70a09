//! Interaction pipeline
//!
//! Every inbound interaction runs the same sequence: resolve the request
//! context from the stored preference, throttle, register the user, turn the
//! input into a navigation action, dispatch it and render the screen. Errors
//! stop at [`InteractionPipeline::handle`]; the user only ever gets a screen.

use std::path::Path;
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::i18n::RequestContext;
use crate::middleware::ThrottleMiddleware;
use crate::models::UserIdentity;
use crate::navigation::{decode, Button, NavKind, NavigationAction, Screen};
use crate::services::{FailureReport, ImportFormat, ItemImportService, OperatorNotifier, ServiceFactory};
use crate::utils::errors::{Result, ShopError};
use crate::utils::helpers::{normalize_whitespace, truncate_text};
use crate::utils::logging::log_admin_action;
use super::commands::Command;
use super::context::{ScreenContext, ShopContext};
use super::preferences::start_screen;
use super::{build_router, ShopRouter};

/// What the user sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    /// Raw callback data of a pressed inline button
    Callback(String),
    Text(String),
}

impl Input {
    fn describe(&self) -> String {
        match self {
            Input::Command(command) => format!("command {:?}", command),
            Input::Callback(data) => format!("callback {}", data),
            Input::Text(text) => format!("text {}", truncate_text(text, 200)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Interaction {
    pub identity: UserIdentity,
    pub input: Input,
}

impl Interaction {
    pub fn new(identity: UserIdentity, input: Input) -> Self {
        Self { identity, input }
    }
}

/// Screen to render plus the context it was resolved under
#[derive(Debug, Clone)]
pub struct Reply {
    pub screen: Screen,
    pub context: RequestContext,
}

pub struct InteractionPipeline {
    shop: Arc<ShopContext>,
    router: ShopRouter,
    notifier: Arc<dyn OperatorNotifier>,
    import: Arc<ItemImportService>,
    throttle: Option<ThrottleMiddleware>,
}

impl InteractionPipeline {
    pub fn new(shop: Arc<ShopContext>, services: &ServiceFactory) -> Result<Self> {
        Ok(Self {
            shop,
            router: build_router()?,
            notifier: Arc::clone(&services.notifier),
            import: Arc::clone(&services.import_service),
            throttle: None,
        })
    }

    pub fn with_throttle(mut self, throttle: ThrottleMiddleware) -> Self {
        self.throttle = Some(throttle);
        self
    }

    pub fn throttle(&self) -> Option<&ThrottleMiddleware> {
        self.throttle.as_ref()
    }

    pub fn is_admin(&self, telegram_id: i64) -> bool {
        self.shop.auth.is_admin(telegram_id)
    }

    /// Run one interaction to its reply
    pub async fn handle(&self, interaction: Interaction) -> Reply {
        let ctx = self.screen_context(interaction.identity).await;
        debug!(
            user_id = ctx.telegram_id(),
            language = %ctx.request.language,
            currency = %ctx.request.currency,
            input = %interaction.input.describe(),
            "Handling interaction"
        );

        let mut screen = match self.dispatch(&ctx, &interaction.input).await {
            Ok(screen) => screen,
            Err(e) => self.recover(&ctx, &interaction.input.describe(), e).await,
        };

        let context = screen.context.take().unwrap_or(ctx.request);
        Reply { screen, context }
    }

    /// Import an uploaded catalog file on behalf of an admin
    ///
    /// The file at `path` is always removed.
    pub async fn ingest_items(&self, identity: UserIdentity, file_name: &str, path: &Path) -> Reply {
        let ctx = self.screen_context(identity).await;
        let description = format!("document {}", file_name);

        let screen = match self.import_upload(&ctx, file_name, path).await {
            Ok(screen) => screen,
            Err(e) => {
                discard_upload(path).await;
                self.recover(&ctx, &description, e).await
            }
        };

        Reply { screen, context: ctx.request }
    }

    /// Reply for a failure that happened in the transport before dispatch
    pub async fn report_failure(&self, identity: UserIdentity, input: &str, error: ShopError) -> Reply {
        let ctx = self.screen_context(identity).await;
        let screen = self.recover(&ctx, input, error).await;
        Reply { screen, context: ctx.request }
    }

    async fn screen_context(&self, identity: UserIdentity) -> ScreenContext {
        let resolution = self.shop.resolver.resolve(&identity, self.shop.store.as_ref()).await;
        if let Some(fallback) = &resolution.fallback {
            warn!(user_id = identity.telegram_id, reason = %fallback, "Using default locale and currency");
        }
        ScreenContext::new(identity, resolution.context, Arc::clone(&self.shop))
    }

    async fn dispatch(&self, ctx: &ScreenContext, input: &Input) -> Result<Screen> {
        if let Some(throttle) = &self.throttle {
            throttle.check(ctx.telegram_id())?;
        }
        self.shop.store.ensure_user(&ctx.identity).await?;

        match input {
            Input::Command(Command::Start) => {
                self.navigate(&NavigationAction::entry(NavKind::Language), ctx).await
            }
            Input::Command(Command::Help) => Ok(start_screen(ctx)),
            Input::Callback(data) => {
                let action = decode(data)?;
                self.navigate(&action, ctx).await
            }
            Input::Text(text) => self.menu_choice(ctx, &normalize_whitespace(text)).await,
        }
    }

    async fn navigate(&self, action: &NavigationAction, ctx: &ScreenContext) -> Result<Screen> {
        let handler = self.router.route(action)?;
        handler(action, ctx).await
    }

    /// Map a reply-keyboard label, in the interaction's language, to a screen
    async fn menu_choice(&self, ctx: &ScreenContext, text: &str) -> Result<Screen> {
        let entry = NavigationAction::entry;

        if text == ctx.t("common.menu.catalog") {
            self.navigate(&entry(NavKind::Catalog), ctx).await
        } else if text == ctx.t("common.menu.profile") {
            self.navigate(&entry(NavKind::Profile), ctx).await
        } else if text == ctx.t("common.menu.cart") {
            self.navigate(&entry(NavKind::Cart), ctx).await
        } else if text == ctx.t("common.menu.faq") {
            Ok(Screen::new(ctx.t("common.faq")))
        } else if text == ctx.t("common.menu.help") {
            let mut screen = Screen::new(ctx.t("common.help"));
            if !ctx.shop.support_link.is_empty() {
                screen = screen.row(vec![Button::url(
                    ctx.t("common.support_button"),
                    ctx.shop.support_link.clone(),
                )]);
            }
            Ok(screen)
        } else if ctx.is_admin() && text == ctx.t("common.menu.admin") {
            self.navigate(&entry(NavKind::Admin), ctx).await
        } else {
            debug!(user_id = ctx.telegram_id(), "Unrecognized text input");
            Ok(Screen::new(ctx.t("common.unknown_input")).with_menu(ctx.main_menu()))
        }
    }

    async fn import_upload(&self, ctx: &ScreenContext, file_name: &str, path: &Path) -> Result<Screen> {
        ctx.require_admin()?;
        self.shop.store.ensure_user(&ctx.identity).await?;

        let Some(format) = ImportFormat::from_file_name(file_name) else {
            discard_upload(path).await;
            return Ok(Screen::new(ctx.format(
                "admin.import.unsupported_format",
                &[("file", file_name.to_string())],
            )));
        };

        log_admin_action(ctx.telegram_id(), "import_items", Some(file_name), None);
        match self.import.import_file(path, format, self.shop.store.as_ref()).await {
            Ok(added) => {
                info!(admin_id = ctx.telegram_id(), added, file = file_name, "Items imported");
                Ok(Screen::new(ctx.format("admin.import.done", &[("count", added.to_string())])))
            }
            Err(ShopError::Import(reason)) => {
                warn!(admin_id = ctx.telegram_id(), file = file_name, reason = %reason, "Import rejected");
                Ok(Screen::new(ctx.format("admin.import.failed", &[("error", reason)])))
            }
            Err(e) => Err(e),
        }
    }

    /// Turn a failed interaction into the screen the user sees
    async fn recover(&self, ctx: &ScreenContext, input: &str, error: ShopError) -> Screen {
        let user_id = ctx.telegram_id();

        match &error {
            ShopError::Decode(_) | ShopError::InvalidInput(_) => {
                info!(user_id, error = %error, "Invalid navigation");
                Screen::new(ctx.t("common.invalid_navigation")).with_menu(ctx.main_menu())
            }
            ShopError::PermissionDenied(_) => {
                warn!(user_id, error = %error, "Access denied");
                Screen::new(ctx.t("common.no_access"))
            }
            ShopError::CategoryNotFound { .. }
            | ShopError::OfferNotFound { .. }
            | ShopError::PurchaseNotFound { .. } => {
                info!(user_id, error = %error, "Requested entry is gone");
                Screen::new(ctx.t("common.not_found")).with_menu(ctx.main_menu())
            }
            ShopError::RateLimitExceeded => Screen::new(ctx.t("common.throttled")),
            _ if !error.needs_operator() => {
                warn!(user_id, input, error = %error, "Interaction failed");
                Screen::new(ctx.t("common.failure"))
            }
            _ => {
                error!(user_id, input, error = %error, severity = %error.severity(), "Interaction failed");

                let report = FailureReport::new(&ctx.identity, input, &error);
                if let Err(e) = self.notifier.notify(&report).await {
                    error!(user_id, error = %e, "Failed to notify operators");
                }
                Screen::new(ctx.t("common.failure"))
            }
        }
    }
}

async fn discard_upload(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        debug!(path = %path.display(), error = %e, "Upload already removed");
    }
}
