//! Tier table configuration.
//!
//! ```toml
//! [[tiers]]
//! name = "level1"
//! lower_bound = "0.9"
//! budget = 3
//! cooldown_ms = 9000
//! stability_reset_ms = 180000   # re-arms the next tier unless `replenishes` says otherwise
//!
//! [safe_zone]
//! replenishes = "level1"
//! ```
//!
//! An empty tier list selects [`TierTable::standard`].

use chrono::Duration;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::price::Price;
use crate::domain::tier::{Tier, TierId, TierTable};
use crate::error::{ConfigError, Result};

/// One `[[tiers]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TierConfig {
    pub name: String,
    /// Inclusive lower bound. Accepts a TOML number or a decimal string.
    pub lower_bound: Decimal,
    #[serde(default = "default_budget")]
    pub budget: u32,
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    #[serde(default)]
    pub stability_reset_ms: Option<u64>,
    /// Name of the tier re-armed by this tier's stability reset.
    #[serde(default)]
    pub replenishes: Option<String>,
}

fn default_budget() -> u32 {
    3
}

fn default_cooldown_ms() -> u64 {
    9000
}

/// `[safe_zone]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SafeZoneConfig {
    /// Tier re-armed whenever price drops below the first tier. Defaults to
    /// the first tier.
    #[serde(default)]
    pub replenishes: Option<String>,
}

fn millis(field: &'static str, ms: u64) -> Result<Duration> {
    i64::try_from(ms)
        .ok()
        .and_then(Duration::try_milliseconds)
        .ok_or_else(|| {
            ConfigError::InvalidValue {
                field,
                reason: format!("{ms} ms is out of range"),
            }
            .into()
        })
}

fn lookup(tiers: &[TierConfig], name: &str) -> Result<TierId> {
    tiers
        .iter()
        .position(|t| t.name == name)
        .map(TierId)
        .ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "replenishes",
                reason: format!("unknown tier {name:?}"),
            }
            .into()
        })
}

/// Build a validated [`TierTable`] from configuration.
///
/// # Errors
///
/// Returns a [`ConfigError`] for out-of-range values or unknown tier names,
/// and a [`TierTableError`](crate::domain::error::TierTableError) when the
/// tiers do not form a valid table.
pub fn build_tier_table(tiers: &[TierConfig], safe_zone: &SafeZoneConfig) -> Result<TierTable> {
    if tiers.is_empty() {
        if safe_zone.replenishes.is_some() {
            return Err(ConfigError::InvalidValue {
                field: "replenishes",
                reason: "safe_zone.replenishes requires explicit [[tiers]]".into(),
            }
            .into());
        }
        return Ok(TierTable::standard());
    }

    let mut built = Vec::with_capacity(tiers.len());
    for (index, config) in tiers.iter().enumerate() {
        let lower_bound =
            Price::try_new(config.lower_bound).map_err(|e| ConfigError::InvalidValue {
                field: "lower_bound",
                reason: format!("tier {}: {e}", config.name),
            })?;
        if config.cooldown_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cooldown_ms",
                reason: format!("tier {}: must be greater than 0", config.name),
            }
            .into());
        }
        let mut tier = Tier::new(
            config.name.clone(),
            lower_bound,
            config.budget,
            millis("cooldown_ms", config.cooldown_ms)?,
        );

        match (config.stability_reset_ms, config.replenishes.as_deref()) {
            (Some(ms), target) => {
                let target = match target {
                    Some(name) => lookup(tiers, name)?,
                    None if index + 1 < tiers.len() => TierId(index + 1),
                    None => {
                        return Err(ConfigError::InvalidValue {
                            field: "stability_reset_ms",
                            reason: format!(
                                "tier {}: top tier has no higher tier to re-arm",
                                config.name
                            ),
                        }
                        .into())
                    }
                };
                tier = tier.with_stability_reset(millis("stability_reset_ms", ms)?, target);
            }
            (None, Some(_)) => {
                return Err(ConfigError::InvalidValue {
                    field: "replenishes",
                    reason: format!("tier {}: requires stability_reset_ms", config.name),
                }
                .into());
            }
            (None, None) => {}
        }
        built.push(tier);
    }

    let safe_target = match safe_zone.replenishes.as_deref() {
        Some(name) => lookup(tiers, name)?,
        None => TierId(0),
    };

    Ok(TierTable::new(built, Some(safe_target))?)
}
