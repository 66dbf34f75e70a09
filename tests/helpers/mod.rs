//! Test helpers module
//!
//! Builds a complete interaction pipeline over the in-memory store and the
//! real locale bundles, plus a Telegram API mock for the transport side.

#![allow(dead_code)]

pub mod memory_store;
pub mod telegram_mock;

pub use memory_store::MemoryStore;
pub use telegram_mock::*;

use std::sync::{Arc, Once};

use async_trait::async_trait;
use tokio::sync::Mutex;

use shopbot::config::Settings;
use shopbot::handlers::{Input, Interaction, InteractionPipeline, Reply, ShopContext};
use shopbot::i18n::I18n;
use shopbot::models::UserIdentity;
use shopbot::navigation::{decode, NavigationAction, Screen};
use shopbot::services::{FailureReport, OperatorNotifier, ServiceFactory};
use shopbot::Result;

pub const ADMIN_ID: i64 = 900;

static INIT: Once = Once::new();

/// Initialize logging for tests (called once)
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Settings pointing at the bundles shipped with the crate
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.bot.token = TEST_TOKEN.to_string();
    settings.bot.admin_ids = vec![ADMIN_ID];
    settings.bot.support_link = "https://t.me/shop_support".to_string();
    settings.i18n.bundles_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/l10n").to_string();
    settings.shop.page_entries = 3;
    settings
}

/// Operator notifier keeping every report for inspection
#[derive(Default)]
pub struct RecordingNotifier {
    pub reports: Mutex<Vec<FailureReport>>,
}

#[async_trait]
impl OperatorNotifier for RecordingNotifier {
    async fn notify(&self, report: &FailureReport) -> Result<()> {
        self.reports.lock().await.push(report.clone());
        Ok(())
    }
}

/// A pipeline wired to an in-memory store and a recording notifier
pub struct TestShop {
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub pipeline: InteractionPipeline,
}

impl TestShop {
    pub async fn new() -> Self {
        Self::with_settings(test_settings()).await
    }

    pub async fn with_settings(settings: Settings) -> Self {
        init_test_logging();

        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let i18n = Arc::new(I18n::load(&settings.i18n).await.expect("bundles load"));
        let services = ServiceFactory::with_notifier(&settings, notifier.clone());
        let shop = Arc::new(ShopContext::new(
            &settings,
            store.clone(),
            i18n,
            services.currency_service.clone(),
        ));
        let pipeline = InteractionPipeline::new(shop, &services).expect("router builds");

        Self { store, notifier, pipeline }
    }

    pub async fn send(&self, identity: &UserIdentity, input: Input) -> Reply {
        self.pipeline
            .handle(Interaction::new(identity.clone(), input))
            .await
    }

    pub async fn text(&self, identity: &UserIdentity, text: &str) -> Reply {
        self.send(identity, Input::Text(text.to_string())).await
    }

    pub async fn press(&self, identity: &UserIdentity, token: &str) -> Reply {
        self.send(identity, Input::Callback(token.to_string())).await
    }

    pub async fn open(&self, identity: &UserIdentity, action: &NavigationAction) -> Reply {
        let token = action.encode().expect("action encodes");
        self.press(identity, token.as_str()).await
    }

    /// Press the button whose label contains `needle`
    pub async fn press_button(&self, identity: &UserIdentity, screen: &Screen, needle: &str) -> Reply {
        let token = button_token(screen, needle);
        self.press(identity, &token).await
    }
}

pub fn user(telegram_id: i64) -> UserIdentity {
    UserIdentity::new(telegram_id, Some(format!("user{}", telegram_id)))
}

/// Callback token of the button whose label contains `needle`
pub fn button_token(screen: &Screen, needle: &str) -> String {
    let button = screen
        .find_button(needle)
        .unwrap_or_else(|| panic!("no button containing {:?} on screen {:?}", needle, screen.text));
    button
        .token()
        .unwrap_or_else(|| panic!("button {:?} is a link", button.label))
        .as_str()
        .to_string()
}

/// Decoded action of the button whose label contains `needle`
pub fn button_action(screen: &Screen, needle: &str) -> NavigationAction {
    decode(&button_token(screen, needle)).expect("button token decodes")
}
