//! ShopBot Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;
use std::time::Duration;

use teloxide::dispatching::UpdateHandler;
use teloxide::{prelude::*, types::Update};
use tracing::{info, warn};
use url::Url;

use shopbot::{
    config::Settings,
    database::{create_pool, run_migrations, DatabaseService},
    handlers::{handle_callback_query, handle_command, handle_message, Command, InteractionPipeline, ShopContext},
    i18n::I18n,
    middleware::ThrottleMiddleware,
    services::ServiceFactory,
    utils::logging,
    ShopError,
};

const THROTTLE_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard flushes the log file on shutdown
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", shopbot::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_pool = create_pool(&settings.database).await?;
    run_migrations(&db_pool).await?;
    let database_service = Arc::new(DatabaseService::new(db_pool));

    // Load every configured bundle, failing on the first missing one
    info!("Loading translations...");
    let i18n = Arc::new(I18n::load(&settings.i18n).await?);

    // Initialize bot
    let mut bot = Bot::new(&settings.bot.token);
    if let Some(api_url) = &settings.bot.api_url {
        info!(api_url = %api_url, "Using custom Bot API server");
        bot = bot.set_api_url(Url::parse(api_url)?);
    }

    // Initialize services
    info!("Initializing services...");
    let services = ServiceFactory::new(bot.clone(), &settings);
    let shop = Arc::new(ShopContext::new(
        &settings,
        database_service,
        i18n,
        Arc::clone(&services.currency_service),
    ));
    let throttle = ThrottleMiddleware::new(&settings.throttle, settings.bot.admin_ids.clone())?;
    let pipeline = Arc::new(InteractionPipeline::new(shop, &services)?.with_throttle(throttle));

    spawn_throttle_cleanup(Arc::clone(&pipeline));

    let mut dispatcher = Dispatcher::builder(bot, create_handler())
        .dependencies(dptree::deps![pipeline])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.kind);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("Error while handling update"))
        .enable_ctrlc_handler()
        .build();

    info!("ShopBot is ready, starting polling...");
    dispatcher.dispatch().await;

    info!("ShopBot has been shut down.");
    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<ShopError> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    // Handle commands
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_command),
                )
                .branch(
                    // Text, menu labels and uploads
                    dptree::endpoint(handle_message),
                ),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback_query))
}

/// Periodically drop throttle buckets of idle users
fn spawn_throttle_cleanup(pipeline: Arc<InteractionPipeline>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(THROTTLE_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            if let Some(throttle) = pipeline.throttle() {
                throttle.cleanup();
            }
        }
    });
}
