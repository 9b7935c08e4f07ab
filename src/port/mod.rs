//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!  ┌──────────────┐    ticks    ┌──────────────┐   alerts   ┌───────────┐
//!  │ PriceStream  │ ──────────▶ │   Monitor    │ ─────────▶ │ Notifier  │
//!  │   adapter    │             │ AlertEngine  │            │  adapter  │
//!  └──────────────┘             └──────────────┘            └───────────┘
//!                                      ▲
//!                                      │ now()
//!                                   Clock
//! ```
//!
//! # Available Ports
//!
//! - [`PriceStream`] - Market-data venue integration
//! - [`Notifier`] - Alert delivery (webhook, Telegram, logging)
//! - [`Clock`] - Decision-time source

pub mod outbound;

pub use outbound::clock::{Clock, SystemClock};
pub use outbound::notifier::{
    AlertEvent, Event, LogNotifier, Notifier, NotifierRegistry, NullNotifier,
};
pub use outbound::stream::{PriceStream, StreamEvent};
