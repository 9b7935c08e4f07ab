//! Notification adapters.
//!
//! Implements the `port::Notifier` trait for the webhook and Telegram
//! backends.

pub mod webhook;

#[cfg(feature = "telegram")]
pub mod telegram;
