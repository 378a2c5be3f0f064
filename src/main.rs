mod bot;
mod commands;
mod config;
mod platform;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::platform::telegram::TelegramTransport;

/// A Telegram bot written in Rust.
///
/// Reads the bot token from TELE_TOKEN, answers /start, /help and /status,
/// and echoes any other text back to the chat.
#[derive(Parser, Debug)]
#[command(name = "kbot", version)]
struct Cli {}

/// Log filter from `RUST_LOG`, which may come from `.env`.
fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,kbot=debug".into())
}

#[tokio::main]
async fn main() -> Result<()> {
    Cli::parse();

    // Load .env file if present (for development), before RUST_LOG is read
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = dotenv {
        info!("No .env file loaded: {}", e);
    }

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");
    info!("  Poll timeout: {:?}", config.poll_timeout);

    let mut transport = TelegramTransport::connect(&config)
        .await
        .context("Failed to create bot")?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            // Without a signal listener the bot runs until it is killed.
            std::future::pending::<()>().await;
        }
        let _ = shutdown_tx.send(());
    });

    bot::run(&mut transport, shutdown_rx).await?;

    info!("Bot stopped");
    Ok(())
}
