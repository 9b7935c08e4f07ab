//! Builders for domain primitives used across tests.
//!
//! Factory functions for prices, ticks and stream events so tests focus on
//! assertions rather than construction boilerplate.

use chrono::Duration;
use rust_decimal::Decimal;

use super::clock::at_secs;
use crate::domain::price::{Price, RawTick};
use crate::domain::tier::{Tier, TierId, TierTable};
use crate::port::outbound::stream::StreamEvent;

/// Parse a price literal. Panics on invalid input.
pub fn price(raw: &str) -> Price {
    Price::parse(raw).unwrap_or_else(|e| panic!("invalid test price {raw:?}: {e}"))
}

/// A raw tick with a venue timestamp `event_secs` seconds after the epoch.
pub fn raw_tick(symbol: &str, price: &str, event_secs: i64) -> RawTick {
    RawTick::new(symbol, price).with_event_time(at_secs(event_secs))
}

/// A [`StreamEvent::Tick`] built from [`raw_tick`].
pub fn tick_event(symbol: &str, price: &str, event_secs: i64) -> StreamEvent {
    StreamEvent::Tick(raw_tick(symbol, price, event_secs))
}

/// Create a [`Disconnected`](StreamEvent::Disconnected) event.
pub fn disconnect_event(reason: &str) -> StreamEvent {
    StreamEvent::Disconnected {
        reason: reason.to_string(),
    }
}

/// A single-tier table `[lower, ∞)` with the given budget and cooldown.
pub fn single_tier_table(lower: Decimal, budget: u32, cooldown_secs: i64) -> TierTable {
    let tier = Tier::new(
        "only",
        Price::try_new(lower).unwrap_or_else(|e| panic!("invalid bound: {e}")),
        budget,
        Duration::seconds(cooldown_secs),
    );
    TierTable::new(vec![tier], Some(TierId(0)))
        .unwrap_or_else(|e| panic!("invalid single-tier table: {e}"))
}
