//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use crate::infrastructure::config::reconnection::ReconnectionConfig;
use crate::infrastructure::config::settings::Config;

/// Fast reconnection config with zero delays so tests never wait.
pub fn reconnection() -> ReconnectionConfig {
    ReconnectionConfig {
        initial_delay_ms: 0,
        max_delay_ms: 0,
        backoff_multiplier: 1.0,
        max_consecutive_failures: 3,
        circuit_breaker_cooldown_ms: 0,
    }
}

/// A TOML document describing the standard three-tier table explicitly.
pub const STANDARD_TIERS_TOML: &str = r#"
[monitor]
symbol = "xplusdt"

[[tiers]]
name = "level1"
lower_bound = "0.9"
budget = 3
cooldown_ms = 9000
stability_reset_ms = 180000

[[tiers]]
name = "level2"
lower_bound = "1.8"
budget = 3
cooldown_ms = 9000
stability_reset_ms = 360000

[[tiers]]
name = "level3"
lower_bound = "2.7"
budget = 3
cooldown_ms = 9000

[safe_zone]
replenishes = "level1"
"#;

/// Parse a config document without consulting the environment.
pub fn from_toml(content: &str) -> Config {
    let config: Config =
        toml::from_str(content).unwrap_or_else(|e| panic!("invalid test config: {e}"));
    config
        .validate()
        .unwrap_or_else(|e| panic!("test config failed validation: {e}"));
    config
}
