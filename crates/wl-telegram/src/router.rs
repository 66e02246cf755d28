//! Dispatcher wiring and run modes.

use std::{net::SocketAddr, sync::Arc};

use teloxide::{
    dispatching::Dispatcher, dptree, error_handlers::LoggingErrorHandler, prelude::*,
    update_listeners::webhooks,
};

use wl_core::{
    config::Config, outbound::SendPort, registry::LinkRegistry, relay::MessageRelay,
};

use crate::handlers;
use crate::webhook::WebhookAnnouncer;
use crate::TelegramMessenger;

/// Everything the handlers need, injected through dptree.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<LinkRegistry>,
    pub relay: Arc<MessageRelay>,
    pub bot_username: String,
}

/// Run the bot until the process is killed: webhook mode when a public host
/// is configured, long polling otherwise (local development).
pub async fn run(cfg: Arc<Config>, registry: Arc<LinkRegistry>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    // Deep links need the bot's @username; resolve it once up front unless
    // the operator pinned it in the environment.
    let bot_username = match cfg.bot_username.clone() {
        Some(name) => name,
        None => bot.get_me().await?.username().to_string(),
    };

    // Basic startup info.
    println!("whisperlink started: @{bot_username}");
    println!(
        "Registry store: {}",
        cfg.storage_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "in-memory".to_string())
    );

    let messenger: Arc<dyn SendPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let relay = Arc::new(MessageRelay::new(registry.clone(), messenger));

    let state = Arc::new(AppState {
        registry,
        relay,
        bot_username,
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![state])
        .build();

    match cfg.webhook_url() {
        Some(webhook_url) => {
            WebhookAnnouncer::new(&cfg, webhook_url.clone()).spawn();

            let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
            let url: url::Url = webhook_url.parse()?;
            println!("Webhook mode on port {}", cfg.port);

            let listener = webhooks::axum(bot, webhooks::Options::new(addr, url)).await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("update listener error"),
                )
                .await;
        }
        None => {
            println!("No webhook host configured; long polling");
            dispatcher.dispatch().await;
        }
    }

    Ok(())
}
