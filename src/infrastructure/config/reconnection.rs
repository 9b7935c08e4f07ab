//! Stream reconnection configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Backoff and circuit-breaker settings for the price stream.
///
/// The 5 s initial delay matches the venue's recommended resubscribe pause.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconnectionConfig {
    /// Delay before the first reconnection attempt (milliseconds).
    pub initial_delay_ms: u64,
    /// Upper bound for the backoff delay (milliseconds).
    pub max_delay_ms: u64,
    /// Growth factor applied after each failed attempt.
    pub backoff_multiplier: f64,
    /// Failures in a row that open the circuit breaker.
    pub max_consecutive_failures: u32,
    /// How long the open circuit blocks reconnection (milliseconds).
    pub circuit_breaker_cooldown_ms: u64,
}

impl Default for ReconnectionConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 5_000,
            max_delay_ms: 60_000,
            backoff_multiplier: 2.0,
            max_consecutive_failures: 10,
            circuit_breaker_cooldown_ms: 300_000,
        }
    }
}

impl ReconnectionConfig {
    #[must_use]
    pub const fn circuit_cooldown(&self) -> Duration {
        Duration::from_millis(self.circuit_breaker_cooldown_ms)
    }

    /// Check the backoff parameters are usable.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &'static str, reason: &str| -> Result<()> {
            Err(ConfigError::InvalidValue {
                field,
                reason: reason.to_string(),
            }
            .into())
        };

        if self.initial_delay_ms == 0 {
            return invalid("initial_delay_ms", "must be greater than 0");
        }
        if self.max_delay_ms < self.initial_delay_ms {
            return invalid("max_delay_ms", "must be >= initial_delay_ms");
        }
        if self.backoff_multiplier.is_nan() || self.backoff_multiplier < 1.0 {
            return invalid("backoff_multiplier", "must be >= 1.0");
        }
        if self.max_consecutive_failures == 0 {
            return invalid("max_consecutive_failures", "must be greater than 0");
        }
        if self.circuit_breaker_cooldown_ms == 0 {
            return invalid("circuit_breaker_cooldown_ms", "must be greater than 0");
        }
        Ok(())
    }
}
