use std::fmt;
use std::time::Duration;

use anyhow::{bail, Result};

/// Environment variable holding the bot API token.
pub const TOKEN_ENV: &str = "TELE_TOKEN";

/// How long a single `getUpdates` request waits for new updates.
pub const POLL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub poll_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("poll_timeout", &self.poll_timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_ENV).unwrap_or_default();
        let token = token.trim();
        if token.is_empty() {
            bail!("{} environment variable is not set", TOKEN_ENV);
        }

        Ok(Self {
            token: token.to_string(),
            poll_timeout: POLL_TIMEOUT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_is_an_error() {
        let err = Config::from_lookup(|_| None).unwrap_err();
        assert_eq!(err.to_string(), "TELE_TOKEN environment variable is not set");
    }

    #[test]
    fn test_blank_token_is_an_error() {
        assert!(Config::from_lookup(|_| Some(String::new())).is_err());
        assert!(Config::from_lookup(|_| Some("  \n".to_string())).is_err());
    }

    #[test]
    fn test_token_is_read_and_trimmed() {
        let config = Config::from_lookup(|key| {
            assert_eq!(key, "TELE_TOKEN");
            Some(" 123456:ABC-def_ghi\n".to_string())
        })
        .unwrap();
        assert_eq!(config.token, "123456:ABC-def_ghi");
        assert_eq!(config.poll_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = Config::from_lookup(|_| Some("123456:secret".to_string())).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }
}
