mod cache;
mod command;
mod config;
mod events;
mod identifier;
mod mock;
mod platform;
mod plugin;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::prelude::*;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::identifier::Identifier;
use crate::plugin::Plugin;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,spongebot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Command prefix: {}", config.core.prefix);
    info!("  Diversity bias: {}", config.spongemock.diversity_bias);
    info!("  Allowed chats: {:?}", config.telegram.allowed_chat_ids);

    let bot = Bot::new(&config.telegram.bot_token);
    let me = bot
        .get_me()
        .await
        .context("Failed to fetch bot identity from Telegram")?;

    let plugin = Plugin::setup(&config, Identifier::new(me.username()))?;
    let plugin = Arc::new(Mutex::new(plugin));

    info!("Bot is starting...");
    platform::telegram::run(bot, plugin.clone(), Arc::new(config)).await?;

    plugin.lock().await.shutdown();
    info!("Bot stopped");

    Ok(())
}
