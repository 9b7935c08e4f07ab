//! Notification channel configuration.

use serde::Deserialize;

/// HTTP method used to fire the webhook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookMethod {
    #[default]
    Get,
    Post,
}

/// Webhook notification configuration.
///
/// The URL usually embeds a secret token, so `TIERWATCH_WEBHOOK_URL` in the
/// environment overrides whatever the file says.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub method: WebhookMethod,
    /// Per-request timeout (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Append symbol, tier, price and remaining budget to the request.
    #[serde(default)]
    pub include_details: bool,
}

const fn default_timeout_ms() -> u64 {
    5000
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            method: WebhookMethod::default(),
            timeout_ms: default_timeout_ms(),
            include_details: false,
        }
    }
}

/// Telegram notification configuration.
///
/// Credentials come from `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramAppConfig {
    #[serde(default)]
    pub enabled: bool,
}
