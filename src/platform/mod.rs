pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A text message received from the bot platform
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub user_id: u64,
    /// Sender's @username, empty if they have none
    pub username: String,
    pub chat_id: i64,
    /// Group title, empty for private chats
    pub chat_title: String,
    /// The message text
    pub text: String,
    pub received_at: DateTime<Utc>,
}

/// Connection to the bot platform.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Username the platform knows this bot by, if any.
    fn bot_username(&self) -> Option<&str>;

    /// Wait for the next batch of messages.
    ///
    /// Returns `Ok(None)` once the source is exhausted. Transient poll
    /// failures are retried by the platform client; an `Err` is fatal to the
    /// run loop.
    async fn next_batch(&mut self) -> Result<Option<Vec<IncomingMessage>>>;

    /// Send a text reply to a chat.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;
}
