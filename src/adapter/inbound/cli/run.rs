//! Handler for the `run` command.

use std::time::Duration;

use tracing::info;

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::paths;
use crate::error::Result;
use crate::infrastructure::bootstrap::{build_monitor, build_price_stream};
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::shutdown::wait_for_signal;

/// Execute the run command.
///
/// Runs in the foreground until SIGINT or SIGTERM.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = paths::load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args);
    config.validate()?;
    config.init_logging();

    info!(
        symbol = %config.monitor.symbol,
        webhook = config.webhook.url.is_some(),
        "tierwatch starting"
    );

    let mut monitor = build_monitor(&config)?;
    monitor.start(build_price_stream(&config)).await?;

    wait_for_signal().await;
    info!("Shutdown signal received");

    if let Some(stats) = monitor.stop().await {
        info!(ticks = stats.ticks, alerts = stats.alerts, "Final statistics");
    }

    // Let in-flight notifications drain before the runtime goes away.
    tokio::time::sleep(Duration::from_millis(config.shutdown_grace_ms)).await;
    info!("tierwatch stopped");
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(symbol) = &args.symbol {
        config.monitor.symbol = symbol.trim().to_ascii_lowercase();
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            config: None,
            symbol: None,
            log_level: None,
            json_logs: false,
        }
    }

    #[test]
    fn no_flags_leave_config_untouched() {
        let mut config = Config::default();
        apply_overrides(&mut config, &args());
        assert_eq!(config.monitor.symbol, "xplusdt");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn flags_override_config() {
        let mut config = Config::default();
        let args = RunArgs {
            symbol: Some(" BTCUSDT ".into()),
            log_level: Some("debug".into()),
            json_logs: true,
            ..args()
        };

        apply_overrides(&mut config, &args);

        assert_eq!(config.monitor.symbol, "btcusdt");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_symbol_override_fails_validation() {
        let mut config = Config::default();
        let args = RunArgs {
            symbol: Some("  ".into()),
            ..args()
        };
        apply_overrides(&mut config, &args);
        assert!(config.validate().is_err());
    }
}
