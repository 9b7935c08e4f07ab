//! Telegram alert delivery.

mod format;

pub mod notifier;

pub use notifier::{TelegramConfig, TelegramNotifier};
