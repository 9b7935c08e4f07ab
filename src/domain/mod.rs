//! Venue-agnostic domain: prices, tiers and the alert engine.
//!
//! Nothing in here performs I/O or reads the clock. Time is passed in.

pub mod engine;
pub mod error;
pub mod price;
pub mod tier;

pub use engine::{Alert, AlertEngine, Decision, EngineState, SuppressReason, Suppression};
pub use price::{Price, RawTick, Tick};
pub use tier::{Band, Tier, TierId, TierTable};
