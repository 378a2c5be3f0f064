use anyhow::{Context, Result};
use tokio::sync::oneshot;
use tracing::{error, info};

use crate::commands::Command;
use crate::platform::{IncomingMessage, Transport};

pub const WELCOME_TEXT: &str =
    "Welcome! I'm your Telegram bot. Use /help to see available commands.";

pub const HELP_TEXT: &str = "Available commands:\n\
     /start - Start the bot\n\
     /help - Show this help message\n\
     /status - Check bot status";

pub const STATUS_TEXT: &str = "Bot is running and healthy!";

pub const ECHO_PREFIX: &str = "I received your message: ";

/// Reply text for a classified message.
pub fn reply_for(command: Command, msg: &IncomingMessage) -> String {
    match command {
        Command::Start => WELCOME_TEXT.to_string(),
        Command::Help => HELP_TEXT.to_string(),
        Command::Status => STATUS_TEXT.to_string(),
        Command::Other => format!("{}{}", ECHO_PREFIX, msg.text),
    }
}

/// One human-readable line describing who sent what where.
fn log_line(command: Command, msg: &IncomingMessage) -> String {
    let event = match command.as_str() {
        Some(name) => format!("Command: {}", name),
        None => format!("Message: {}", msg.text),
    };
    format!(
        "[{}] {} | User: {} (ID: {}) | Chat: {} (ID: {})",
        msg.received_at.format("%Y-%m-%d %H:%M:%S"),
        event,
        msg.username,
        msg.user_id,
        msg.chat_title,
        msg.chat_id,
    )
}

/// Classify a message, log it and send the reply back to its chat.
pub async fn handle_message<T: Transport + ?Sized>(
    transport: &T,
    msg: &IncomingMessage,
) -> Result<()> {
    let command = Command::parse(&msg.text, transport.bot_username());
    info!("{}", log_line(command, msg));

    let reply = reply_for(command, msg);
    transport.send_text(msg.chat_id, &reply).await
}

/// Run the poll loop until `shutdown` fires or the transport is exhausted.
pub async fn run<T: Transport + ?Sized>(
    transport: &mut T,
    mut shutdown: oneshot::Receiver<()>,
) -> Result<()> {
    info!("Bot started...");

    loop {
        let batch = tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping bot");
                break;
            }
            batch = transport.next_batch() => batch.context("Polling for updates failed")?,
        };

        let Some(messages) = batch else {
            info!("Update source closed, stopping bot");
            break;
        };

        for msg in &messages {
            if let Err(e) = handle_message(&*transport, msg).await {
                error!("Error handling message in chat {}: {:#}", msg.chat_id, e);
            }
        }
    }

    Ok(())
}
