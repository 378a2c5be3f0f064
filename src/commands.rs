/// The fixed set of commands the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Status,
    /// Any other text, answered by the echo handler.
    Other,
}

impl Command {
    /// Classify a message by its leading token.
    ///
    /// The token is everything up to the first whitespace character and is
    /// matched case-sensitively. In groups Telegram appends the addressed bot,
    /// as in `/help@kbot`; that form only matches when the name is ours.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Self {
        let token = text.split(char::is_whitespace).next().unwrap_or_default();

        let command = match token.split_once('@') {
            Some((head, target)) => match bot_username {
                Some(me) if target.eq_ignore_ascii_case(me) => head,
                _ => return Self::Other,
            },
            None => token,
        };

        match command {
            "/start" => Self::Start,
            "/help" => Self::Help,
            "/status" => Self::Status,
            _ => Self::Other,
        }
    }

    /// Slash form used in log lines, `None` for plain text.
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            Self::Start => Some("/start"),
            Self::Help => Some("/help"),
            Self::Status => Some("/status"),
            Self::Other => None,
        }
    }
}

/// Entries for the Telegram command menu, as (command, description).
pub fn menu() -> Vec<(&'static str, &'static str)> {
    vec![
        ("start", "Start the bot"),
        ("help", "Show this help message"),
        ("status", "Check bot status"),
    ]
}
