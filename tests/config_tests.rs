//! Configuration file loading.

use std::io::Write;

use tempfile::NamedTempFile;
use tierwatch::error::{ConfigError, Error};
use tierwatch::infrastructure::config::settings::Config;
use tierwatch::testkit::config::STANDARD_TIERS_TOML;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn explicit_standard_tiers_match_builtin_table() {
    let file = write_temp_config(STANDARD_TIERS_TOML);
    let config = Config::load(file.path()).expect("load config");

    let table = config.tier_table().expect("tier table");
    assert_eq!(table, tierwatch::domain::TierTable::standard());
}

#[test]
fn missing_file_is_read_error() {
    let result = Config::load("/nonexistent/tierwatch/config.toml");
    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}

#[test]
fn malformed_toml_is_parse_error() {
    let file = write_temp_config("[[tiers]\nname = ");
    let result = Config::load(file.path());
    assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
}

#[test]
fn duplicate_tier_names_are_rejected() {
    let file = write_temp_config(
        r#"
[[tiers]]
name = "a"
lower_bound = "1"

[[tiers]]
name = "a"
lower_bound = "2"
"#,
    );
    assert!(matches!(Config::load(file.path()), Err(Error::Tier(_))));
}

#[test]
fn non_http_webhook_is_rejected() {
    let file = write_temp_config(
        r#"
[webhook]
url = "ftp://example.com/hook"
"#,
    );
    match Config::load(file.path()) {
        Err(Error::Config(ConfigError::InvalidValue { field, .. })) => {
            assert_eq!(field, "webhook_url");
        }
        other => panic!("expected invalid webhook_url, got {other:?}"),
    }
}

#[test]
fn partial_document_keeps_defaults() {
    let file = write_temp_config(
        r#"
[monitor]
symbol = "btcusdt"

[logging]
level = "debug"
"#,
    );
    let config = Config::load(file.path()).expect("load config");

    assert_eq!(config.monitor.symbol, "btcusdt");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "pretty");
    assert_eq!(config.reconnection.initial_delay_ms, 5000);
    assert!(config.tiers.is_empty());
    assert_eq!(config.tier_table().expect("tier table").len(), 3);
}
