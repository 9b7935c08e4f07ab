//! Handlers for the `check` subcommands.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;

use crate::adapter::inbound::cli::{output, paths};
use crate::adapter::outbound::binance::BinanceTickerStream;
use crate::adapter::outbound::notifier::webhook::deliver;
use crate::domain::tier::{TierId, TierTable};
use crate::error::{ConfigError, Error, Result};
use crate::infrastructure::bootstrap::webhook_settings;
use crate::port::outbound::notifier::Event;
use crate::port::outbound::stream::{PriceStream, StreamEvent};

/// How long `check connection` waits for the first tick.
const FIRST_TICK_TIMEOUT: Duration = Duration::from_secs(15);

/// Validate the configuration and print the resulting tier table.
pub fn execute_config(config_path: Option<&Path>) -> Result<()> {
    let config = paths::load_config(config_path)?;
    let table = config.tier_table()?;

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Configuration");
    output::field("Symbol", &config.monitor.symbol);
    output::field("WebSocket", &config.stream.ws_url);
    output::field(
        "Webhook",
        if config.webhook.url.is_some() { "configured" } else { "disabled" },
    );

    output::section("Tiers");
    print_tier_table(&table);

    output::success("Configuration is valid");
    Ok(())
}

fn print_tier_table(table: &TierTable) {
    let name_of = |id: TierId| table.get(id).map_or("?", |t| t.name.as_str());

    if let Some(first) = table.tiers().first() {
        let re_arms = table
            .safe_replenishes()
            .map_or_else(|| "-".to_string(), |id| format!("re-arms {}", name_of(id)));
        output::field("safe", format!("< {}  {re_arms}", first.lower_bound));
    }

    for (index, tier) in table.tiers().iter().enumerate() {
        let range = match table.upper_bound(TierId(index)) {
            Some(upper) => format!("[{}, {upper})", tier.lower_bound),
            None => format!(">= {}", tier.lower_bound),
        };
        let mut line = format!(
            "{range}  budget {}  cooldown {}s",
            tier.budget,
            tier.cooldown.num_milliseconds() as f64 / 1000.0
        );
        if let (Some(after), Some(target)) = (tier.stability_reset, tier.replenishes) {
            line.push_str(&format!(
                "  re-arms {} after {}s",
                name_of(target),
                after.num_seconds()
            ));
        }
        output::field(&tier.name, line);
    }
}

/// Connect to the venue, subscribe and wait for one tick.
pub async fn execute_connection(config_path: Option<&Path>) -> Result<()> {
    let config = paths::load_config(config_path)?;
    let symbol = config.monitor.symbol.to_ascii_lowercase();

    output::section("Connection Check");
    output::field("Symbol", &symbol);
    output::field("WebSocket", &config.stream.ws_url);

    let mut stream = BinanceTickerStream::new(config.stream.ws_url.clone());

    output::action("Connecting to", stream.venue_name());
    stream.connect().await?;
    output::success("WebSocket connected");

    stream.subscribe(std::slice::from_ref(&symbol)).await?;
    output::success("Subscription accepted");

    output::action("Waiting for", "first tick");
    let deadline = tokio::time::Instant::now() + FIRST_TICK_TIMEOUT;
    loop {
        let event = tokio::time::timeout_at(deadline, stream.next_event())
            .await
            .map_err(|_| {
                Error::Connection(format!(
                    "no tick for {symbol} within {}s",
                    FIRST_TICK_TIMEOUT.as_secs()
                ))
            })?;

        match event {
            Some(StreamEvent::Tick(tick)) if tick.symbol == symbol => {
                output::field("Price", &tick.price);
                if let Some(at) = tick.event_time {
                    output::field("Event time", at.to_rfc3339());
                }
                break;
            }
            Some(StreamEvent::Tick(_)) => {}
            Some(StreamEvent::Disconnected { reason }) => {
                return Err(Error::Connection(format!("disconnected: {reason}")));
            }
            None => return Err(Error::Connection("stream ended".into())),
        }
    }

    drop(stream);
    output::success("Connection checks passed");
    Ok(())
}

/// Send one test notification through the configured webhook.
pub async fn execute_webhook(config_path: Option<&Path>) -> Result<()> {
    let config = paths::load_config(config_path)?;
    let settings = webhook_settings(&config.webhook)?.ok_or(ConfigError::MissingField {
        field: "webhook_url",
    })?;

    output::section("Webhook Check");
    output::field("Host", settings.url.host_str().unwrap_or("-"));
    output::field("Method", &settings.method);
    output::field("Sent at", Utc::now().to_rfc3339());

    let client = settings.client()?;
    let status = deliver(&client, &settings, &Event::Test).await?;

    output::field("Status", status);
    output::success("Webhook delivered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn execute_config_accepts_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", crate::testkit::config::STANDARD_TIERS_TOML).unwrap();
        assert!(execute_config(Some(file.path())).is_ok());
    }

    #[test]
    fn execute_config_rejects_unordered_tiers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[[tiers]]
name = "high"
lower_bound = "1.0"

[[tiers]]
name = "low"
lower_bound = "0.9"
"#
        )
        .unwrap();
        assert!(execute_config(Some(file.path())).is_err());
    }

    #[test]
    fn execute_config_requires_explicit_file_to_exist() {
        let result = execute_config(Some(Path::new("/nonexistent/tierwatch.toml")));
        assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
    }
}
