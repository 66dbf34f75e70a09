//! Dependencies handed to every screen handler

use std::sync::Arc;

use crate::config::{Settings, ShopConfig};
use crate::database::store::ShopStore;
use crate::i18n::{I18n, LocaleResolver, RequestContext};
use crate::middleware::AuthMiddleware;
use crate::models::UserIdentity;
use crate::navigation::{Button, NavKind, NavigationAction};
use crate::services::CurrencyService;
use crate::utils::errors::{Result, ShopError};

/// Process-wide, immutable state shared by all interactions
pub struct ShopContext {
    pub store: Arc<dyn ShopStore>,
    pub i18n: Arc<I18n>,
    pub currency: Arc<CurrencyService>,
    pub resolver: LocaleResolver,
    pub auth: AuthMiddleware,
    pub shop: ShopConfig,
    pub support_link: String,
    pub supported_currencies: Vec<String>,
}

impl ShopContext {
    pub fn new(
        settings: &Settings,
        store: Arc<dyn ShopStore>,
        i18n: Arc<I18n>,
        currency: Arc<CurrencyService>,
    ) -> Self {
        Self {
            resolver: LocaleResolver::new(&i18n, &settings.currency),
            auth: AuthMiddleware::new(&settings.bot.admin_ids),
            shop: settings.shop.clone(),
            support_link: settings.bot.support_link.clone(),
            supported_currencies: settings.currency.supported_currencies.clone(),
            store,
            i18n,
            currency,
        }
    }
}

/// Everything one handler invocation may use
pub struct ScreenContext {
    pub identity: UserIdentity,
    pub request: RequestContext,
    pub shop: Arc<ShopContext>,
}

impl ScreenContext {
    pub fn new(identity: UserIdentity, request: RequestContext, shop: Arc<ShopContext>) -> Self {
        Self { identity, request, shop }
    }

    /// Same user and dependencies under another request context
    pub fn with_request(&self, request: RequestContext) -> Self {
        Self {
            identity: self.identity.clone(),
            request,
            shop: Arc::clone(&self.shop),
        }
    }

    pub fn store(&self) -> &dyn ShopStore {
        self.shop.store.as_ref()
    }

    pub fn telegram_id(&self) -> i64 {
        self.identity.telegram_id
    }

    pub fn language(&self) -> &str {
        &self.request.language
    }

    pub fn t(&self, key: &str) -> String {
        self.shop.i18n.t(key, &self.request.language, None)
    }

    pub fn format(&self, key: &str, params: &[(&str, String)]) -> String {
        self.shop.i18n.format(key, &self.request.language, params)
    }

    pub fn plural(&self, key: &str, count: i64) -> String {
        self.shop.i18n.tp(key, &self.request.language, count, None)
    }

    /// Render a base-currency amount in this interaction's currency
    pub fn price(&self, amount: f64) -> String {
        self.shop.currency.format_price(amount, &self.request, &self.shop.i18n)
    }

    pub fn is_admin(&self) -> bool {
        self.shop.auth.is_admin(self.identity.telegram_id)
    }

    pub fn require_admin(&self) -> Result<()> {
        self.shop.auth.check_admin_auth(self.identity.telegram_id)
    }

    /// Localized labels of the persistent reply menu
    pub fn main_menu(&self) -> Vec<Vec<String>> {
        let mut menu = vec![
            vec![self.t("common.menu.catalog")],
            vec![self.t("common.menu.profile"), self.t("common.menu.cart")],
            vec![self.t("common.menu.faq"), self.t("common.menu.help")],
        ];
        if self.is_admin() {
            menu.push(vec![self.t("common.menu.admin")]);
        }
        menu
    }

    /// Button back to the entry screen of `kind`
    pub fn back_to(&self, kind: NavKind) -> Result<Button> {
        self.back(&NavigationAction::entry(kind))
    }

    pub fn back(&self, action: &NavigationAction) -> Result<Button> {
        Ok(Button::navigate(self.t("common.back"), action)?)
    }
}

/// A required argument of a decoded action, as a database id
pub fn required_id(value: Option<u32>, field: &str) -> Result<i32> {
    let value = value.ok_or_else(|| ShopError::InvalidInput(format!("missing {}", field)))?;
    i32::try_from(value).map_err(|_| ShopError::InvalidInput(format!("{} out of range", field)))
}

/// A database id as carried in a token
pub fn token_id(id: i32) -> Result<u32> {
    u32::try_from(id).map_err(|_| ShopError::InvalidInput(format!("negative id {}", id)))
}
