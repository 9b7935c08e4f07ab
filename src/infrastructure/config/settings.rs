//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file with environment variable overrides
//! for secrets like `TIERWATCH_WEBHOOK_URL`.
//!
//! # Example
//!
//! ```no_run
//! use tierwatch::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use serde::Deserialize;
use std::path::Path;

use super::logging::LoggingConfig;
use super::notifier::{TelegramAppConfig, WebhookConfig};
use super::reconnection::ReconnectionConfig;
use super::tiers::{build_tier_table, SafeZoneConfig, TierConfig};
use crate::domain::tier::TierTable;
use crate::error::{ConfigError, Result};

/// Environment variable that overrides `[webhook].url`.
pub const WEBHOOK_URL_ENV: &str = "TIERWATCH_WEBHOOK_URL";

/// `[monitor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Instrument to watch, in the venue's lowercase form.
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

fn default_symbol() -> String {
    "xplusdt".to_string()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
        }
    }
}

/// `[stream]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Market-data WebSocket endpoint.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
}

fn default_ws_url() -> String {
    "wss://fstream.binance.com/ws".to_string()
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
        }
    }
}

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`]. Every section is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub stream: StreamConfig,

    /// WebSocket reconnection settings.
    ///
    /// Controls backoff delays and circuit breaker behavior.
    #[serde(default)]
    pub reconnection: ReconnectionConfig,

    /// Alerting tiers, ascending by lower bound. Empty selects the standard
    /// three-tier table.
    #[serde(default)]
    pub tiers: Vec<TierConfig>,

    #[serde(default)]
    pub safe_zone: SafeZoneConfig,

    #[serde(default)]
    pub webhook: WebhookConfig,

    #[serde(default)]
    pub telegram: TelegramAppConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Pause between stopping the monitor and process exit (milliseconds).
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

const fn default_shutdown_grace_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig::default(),
            stream: StreamConfig::default(),
            reconnection: ReconnectionConfig::default(),
            tiers: Vec::new(),
            safe_zone: SafeZoneConfig::default(),
            webhook: WebhookConfig::default(),
            telegram: TelegramAppConfig::default(),
            logging: LoggingConfig::default(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Applies the `TIERWATCH_WEBHOOK_URL` override before validating.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - Validation fails (e.g., unordered tiers or a malformed URL)
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Some(url) = std::env::var(WEBHOOK_URL_ENV)
            .ok()
            .filter(|u| !u.trim().is_empty())
        {
            config.webhook.url = Some(url);
        }

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are present and values are within
    /// acceptable ranges.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.monitor.symbol.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "symbol" }.into());
        }
        if self.stream.ws_url.is_empty() {
            return Err(ConfigError::MissingField { field: "ws_url" }.into());
        }
        url::Url::parse(&self.stream.ws_url).map_err(|e| ConfigError::InvalidValue {
            field: "ws_url",
            reason: e.to_string(),
        })?;

        self.reconnection.validate()?;

        if let Some(raw) = &self.webhook.url {
            let parsed = url::Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
                field: "webhook_url",
                reason: e.to_string(),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidValue {
                    field: "webhook_url",
                    reason: format!("unsupported scheme {}", parsed.scheme()),
                }
                .into());
            }
        }
        if self.webhook.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "format",
                reason: "must be \"pretty\" or \"json\"".to_string(),
            }
            .into());
        }

        self.tier_table()?;
        Ok(())
    }

    /// Build the tier table described by `[[tiers]]` and `[safe_zone]`.
    #[allow(clippy::result_large_err)]
    pub fn tier_table(&self) -> Result<TierTable> {
        build_tier_table(&self.tiers, &self.safe_zone)
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
