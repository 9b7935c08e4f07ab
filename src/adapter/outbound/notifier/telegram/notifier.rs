//! Telegram notifier.
//!
//! Requires the `telegram` feature to be enabled.

use teloxide::prelude::*;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::port::outbound::notifier::{Event, Notifier};

use super::format::format_event_message;

/// Bot credentials and target chat.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot API token obtained from BotFather.
    pub bot_token: String,
    /// Target chat ID for notifications.
    pub chat_id: i64,
}

/// Environment variable holding the bot token.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
/// Environment variable holding the target chat id.
pub const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

impl TelegramConfig {
    /// Read credentials from `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build credentials from any key lookup. `None` if the token is missing
    /// or blank, or the chat id is not an integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let bot_token = lookup(BOT_TOKEN_ENV).filter(|t| !t.trim().is_empty())?;
        let chat_id = lookup(CHAT_ID_ENV)?.trim().parse().ok()?;
        Some(Self { bot_token, chat_id })
    }
}

/// Telegram notifier that sends messages to a chat from a background worker.
pub struct TelegramNotifier {
    sender: mpsc::UnboundedSender<Event>,
}

impl TelegramNotifier {
    /// Create a new Telegram notifier and spawn the background worker.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(config: TelegramConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(telegram_worker(config, receiver));
        Self { sender }
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, event: Event) {
        if self.sender.send(event).is_err() {
            warn!("Telegram notifier channel closed");
        }
    }
}

async fn telegram_worker(config: TelegramConfig, mut receiver: mpsc::UnboundedReceiver<Event>) {
    let bot = Bot::new(&config.bot_token);
    let chat_id = ChatId(config.chat_id);

    info!(chat_id = config.chat_id, "Telegram notifier started");

    while let Some(event) = receiver.recv().await {
        let text = format_event_message(&event);
        if let Err(e) = bot.send_message(chat_id, text).await {
            error!(error = %e, "Failed to send Telegram message");
        }
    }

    warn!("Telegram notifier worker shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_token_disables_telegram() {
        assert!(TelegramConfig::from_lookup(lookup(&[(CHAT_ID_ENV, "1")])).is_none());
        assert!(
            TelegramConfig::from_lookup(lookup(&[(BOT_TOKEN_ENV, " "), (CHAT_ID_ENV, "1")]))
                .is_none()
        );
    }

    #[test]
    fn chat_id_must_be_an_integer() {
        let vars = [(BOT_TOKEN_ENV, "token"), (CHAT_ID_ENV, "@channel")];
        assert!(TelegramConfig::from_lookup(lookup(&vars)).is_none());
    }

    #[test]
    fn group_chat_ids_are_negative() {
        let vars = [(BOT_TOKEN_ENV, "token"), (CHAT_ID_ENV, " -100123 ")];
        let config = TelegramConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.bot_token, "token");
        assert_eq!(config.chat_id, -100_123);
    }
}
