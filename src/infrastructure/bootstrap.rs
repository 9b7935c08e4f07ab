//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use tracing::{info, warn};
use url::Url;

use crate::adapter::outbound::binance::BinanceTickerStream;
use crate::adapter::outbound::notifier::webhook::{WebhookNotifier, WebhookSettings};
#[cfg(feature = "telegram")]
use crate::adapter::outbound::notifier::telegram::{TelegramConfig, TelegramNotifier};
use crate::application::monitor::Monitor;
use crate::domain::engine::AlertEngine;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::notifier::{WebhookConfig, WebhookMethod};
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::exchange::ReconnectingPriceStream;
use crate::port::outbound::clock::SystemClock;
use crate::port::outbound::notifier::{LogNotifier, NotifierRegistry};
use crate::port::outbound::stream::PriceStream;

/// Webhook delivery settings, or `None` when no URL is configured.
#[allow(clippy::result_large_err)]
pub fn webhook_settings(config: &WebhookConfig) -> Result<Option<WebhookSettings>> {
    let Some(raw) = &config.url else {
        return Ok(None);
    };
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        field: "webhook_url",
        reason: e.to_string(),
    })?;
    Ok(Some(WebhookSettings {
        url,
        method: match config.method {
            WebhookMethod::Get => Method::GET,
            WebhookMethod::Post => Method::POST,
        },
        timeout: Duration::from_millis(config.timeout_ms),
        include_details: config.include_details,
    }))
}

/// Build notifier registry from configuration.
///
/// Always includes a [`LogNotifier`]. Must be called from within a Tokio
/// runtime because delivery workers are spawned here.
#[allow(clippy::result_large_err)]
pub fn build_notifier_registry(config: &Config) -> Result<NotifierRegistry> {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));

    match webhook_settings(&config.webhook)? {
        Some(settings) => {
            registry.register(Box::new(WebhookNotifier::new(settings)?));
            info!("Webhook notifier enabled");
        }
        None => warn!("No webhook URL configured, alerts will only be logged"),
    }

    #[cfg(feature = "telegram")]
    if config.telegram.enabled {
        if let Some(tg_config) = TelegramConfig::from_env() {
            registry.register(Box::new(TelegramNotifier::new(tg_config)));
            info!("Telegram notifier enabled");
        } else {
            warn!("Telegram enabled but TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set");
        }
    }

    #[cfg(not(feature = "telegram"))]
    if config.telegram.enabled {
        warn!("Telegram enabled in config but this build lacks the telegram feature");
    }

    Ok(registry)
}

/// The configured venue stream wrapped with automatic reconnection.
pub fn build_price_stream(config: &Config) -> Box<dyn PriceStream> {
    let inner = BinanceTickerStream::new(config.stream.ws_url.clone());
    Box::new(ReconnectingPriceStream::new(inner, config.reconnection.clone()))
}

/// Assemble a stopped [`Monitor`] on the system clock.
#[allow(clippy::result_large_err)]
pub fn build_monitor(config: &Config) -> Result<Monitor> {
    let table = Arc::new(config.tier_table()?);
    info!(tiers = table.len(), "Tier table loaded");
    let notifiers = Arc::new(build_notifier_registry(config)?);
    info!(notifiers = notifiers.len(), "Notifiers initialized");

    Ok(Monitor::new(
        AlertEngine::new(table),
        Arc::new(SystemClock),
        notifiers,
        config.monitor.symbol.clone(),
    ))
}
