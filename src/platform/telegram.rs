use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use teloxide::prelude::*;
use teloxide::types::{AllowedUpdate, BotCommand, UpdateKind};
use teloxide::update_listeners::{AsUpdateStream, Polling};
use teloxide::{ApiError, RequestError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::commands;
use crate::config::Config;
use crate::platform::{IncomingMessage, Transport};

const MAX_MESSAGE_LEN: usize = 4000;
const UPDATE_BUFFER: usize = 64;

type Polled = Result<IncomingMessage, RequestError>;

/// Split long messages for Telegram's 4096 char limit
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max_len).min(text.len());
        // Walk back to a valid UTF-8 char boundary so slicing doesn't panic
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }
        let actual_end = if end < text.len() {
            text[start..end]
                .rfind('\n')
                .or_else(|| text[start..end].rfind(' '))
                .map(|pos| start + pos + 1)
                .unwrap_or(end)
        } else {
            end
        };

        chunks.push(text[start..actual_end].to_string());
        start = actual_end;
    }

    chunks
}

/// Chunks worth sending: Telegram rejects whitespace-only text.
fn reply_chunks(text: &str, max_len: usize) -> Vec<String> {
    split_message(text, max_len)
        .into_iter()
        .filter(|chunk| !chunk.trim().is_empty())
        .collect()
}

/// Reject tokens that can't be a bot token (`<bot id>:<secret>`) before
/// talking to the API.
fn check_token_format(token: &str) -> Result<()> {
    let Some((id, secret)) = token.split_once(':') else {
        bail!("Malformed bot token: expected <bot id>:<secret>");
    };
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        bail!("Malformed bot token: bot id must be numeric");
    }
    if secret.is_empty()
        || !secret
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        bail!("Malformed bot token: invalid secret");
    }
    Ok(())
}

fn to_incoming(msg: &Message) -> Option<IncomingMessage> {
    let user = msg.from.as_ref()?;
    let text = msg.text()?;

    Some(IncomingMessage {
        user_id: user.id.0,
        username: user.username.clone().unwrap_or_default(),
        chat_id: msg.chat.id.0,
        chat_title: msg.chat.title().unwrap_or_default().to_string(),
        text: text.to_string(),
        received_at: msg.date,
    })
}

fn incoming_from_update(update: Update) -> Option<IncomingMessage> {
    match update.kind {
        UpdateKind::Message(msg) => {
            let incoming = to_incoming(&msg);
            if incoming.is_none() {
                debug!("Skipping non-text message in chat {}", msg.chat.id);
            }
            incoming
        }
        _ => {
            debug!("Unhandled update: {:?}", update.id);
            None
        }
    }
}

/// Drive teloxide's long-polling listener and hand text messages over.
async fn forward_updates(mut polling: Polling<Bot>, tx: mpsc::Sender<Polled>) {
    let stream = polling.as_stream();
    futures::pin_mut!(stream);

    while let Some(update) = stream.next().await {
        let polled = match update {
            Ok(update) => match incoming_from_update(update) {
                Some(incoming) => Ok(incoming),
                None => continue,
            },
            Err(e) => Err(e),
        };
        if tx.send(polled).await.is_err() {
            break;
        }
    }
}

/// Telegram Bot API client backed by teloxide's polling listener
pub struct TelegramTransport {
    bot: Bot,
    username: Option<String>,
    updates: mpsc::Receiver<Polled>,
    listener: JoinHandle<()>,
}

impl TelegramTransport {
    /// Create the client, authenticate with `getMe` and start polling.
    pub async fn connect(config: &Config) -> Result<Self> {
        check_token_format(&config.token)?;

        let bot = Bot::new(&config.token);
        let me = bot
            .get_me()
            .await
            .context("Failed to authenticate with the Telegram Bot API")?;
        let username = me.user.username.clone();

        info!(
            "Authorized as @{} (ID: {})",
            username.as_deref().unwrap_or("<none>"),
            me.user.id.0
        );

        let menu: Vec<BotCommand> = commands::menu()
            .into_iter()
            .map(|(command, description)| BotCommand::new(command, description))
            .collect();
        if let Err(e) = bot.set_my_commands(menu).await {
            warn!("Failed to register command menu: {}", e);
        }

        let polling = Polling::builder(bot.clone())
            .timeout(config.poll_timeout)
            .allowed_updates(vec![AllowedUpdate::Message])
            .build();
        let (tx, rx) = mpsc::channel(UPDATE_BUFFER);
        let listener = tokio::spawn(forward_updates(polling, tx));

        Ok(Self::with_updates(bot, username, rx, listener))
    }

    fn with_updates(
        bot: Bot,
        username: Option<String>,
        updates: mpsc::Receiver<Polled>,
        listener: JoinHandle<()>,
    ) -> Self {
        Self {
            bot,
            username,
            updates,
            listener,
        }
    }
}

impl Drop for TelegramTransport {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    fn bot_username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    async fn next_batch(&mut self) -> Result<Option<Vec<IncomingMessage>>> {
        loop {
            let Some(first) = self.updates.recv().await else {
                return Ok(None);
            };

            let mut messages = Vec::new();
            let mut pending = Some(first);
            while let Some(polled) = pending.take().or_else(|| self.updates.try_recv().ok()) {
                match polled {
                    Ok(incoming) => messages.push(incoming),
                    Err(RequestError::Api(ApiError::InvalidToken)) => {
                        bail!("Telegram rejected the bot token");
                    }
                    // teloxide backs off before its next poll.
                    Err(e) => warn!("Polling failed: {}", e),
                }
            }

            if !messages.is_empty() {
                return Ok(Some(messages));
            }
        }
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        for chunk in reply_chunks(text, MAX_MESSAGE_LEN) {
            self.bot
                .send_message(ChatId(chat_id), chunk)
                .await
                .with_context(|| format!("Failed to send message to chat {}", chat_id))?;
        }
        Ok(())
    }
}
