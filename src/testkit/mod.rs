//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`stream`] - Mock [`PriceStream`](crate::port::PriceStream)
//!   implementations: `ScriptedStream`, `ChannelStream`.
//! - [`clock`] - `ManualClock` and epoch-relative timestamps.
//! - [`domain`] - Builders for prices, ticks and stream events.
//! - [`config`] - Canonical test configurations.

pub mod clock;
pub mod config;
pub mod domain;
pub mod stream;
