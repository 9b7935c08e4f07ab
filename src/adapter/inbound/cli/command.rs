//! Command-line interface definitions.
//!
//! Defines the CLI structure for tierwatch using `clap`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tiered, rate-limited price alerts for a streamed instrument
#[derive(Parser, Debug)]
#[command(name = "tierwatch")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the tierwatch CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the configured symbol and raise alerts (foreground)
    Run(RunArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `tierwatch check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration and print the tier table.
    Config(ConfigPathArg),
    /// Connect to the venue, subscribe, and wait for one tick.
    Connection(ConfigPathArg),
    /// Send one test notification through the webhook.
    Webhook(ConfigPathArg),
}

/// Shared argument struct for commands that require only a configuration path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file [default: ./config.toml if present].
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the configuration file [default: ./config.toml if present].
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the monitored symbol (e.g. xplusdt).
    #[arg(long)]
    pub symbol: Option<String>,

    /// Override log level (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty-printed logs.
    #[arg(long)]
    pub json_logs: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_overrides() {
        let cli = Cli::try_parse_from([
            "tierwatch",
            "run",
            "-c",
            "alt.toml",
            "--symbol",
            "btcusdt",
            "--log-level",
            "debug",
            "--json-logs",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config, Some(PathBuf::from("alt.toml")));
        assert_eq!(args.symbol.as_deref(), Some("btcusdt"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.json_logs);
    }

    #[test]
    fn check_subcommands_parse() {
        for name in ["config", "connection", "webhook"] {
            let cli = Cli::try_parse_from(["tierwatch", "check", name]).unwrap();
            assert!(matches!(cli.command, Commands::Check(_)));
        }
    }
}
