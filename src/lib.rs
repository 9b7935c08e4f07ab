//! Tierwatch - tiered, rate-limited price alerts for a streamed instrument.
//!
//! Prices arrive from a market-data WebSocket, are classified into
//! configured tiers, and raise alerts subject to a per-tier budget and
//! cooldown. Exhausted tiers are re-armed by stability resets or by price
//! falling back into the safe band.
//!
//! # Modules
//!
//! - [`domain`] - Prices, the tier table and the alert engine (pure, no I/O)
//! - [`port`] - Traits for the price stream, notifiers and the clock
//! - [`adapter`] - Binance stream, webhook/Telegram notifiers and the CLI
//! - [`application`] - The monitor driving ticks through the engine
//! - [`infrastructure`] - Configuration, reconnection, wiring and shutdown
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `telegram` - Telegram notifier (enabled by default)
//! - `testkit` - Test doubles shared with integration tests
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chrono::Utc;
//! use tierwatch::domain::{AlertEngine, Price, TierTable};
//!
//! let mut engine = AlertEngine::new(Arc::new(TierTable::standard()));
//! let decision = engine.evaluate(Price::parse("1.02").unwrap(), Utc::now());
//! assert!(decision.is_send());
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
