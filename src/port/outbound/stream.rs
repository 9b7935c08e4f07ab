//! Price stream port.
//!
//! This module defines the trait a market-data venue adapter implements to
//! feed ticks into the monitor. Reconnection is layered on top of it by
//! [`ReconnectingPriceStream`](crate::infrastructure::exchange::reconnecting::ReconnectingPriceStream).

use async_trait::async_trait;

use crate::domain::price::RawTick;
use crate::error::Error;

/// Events produced by a price stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A price observation, not yet validated.
    Tick(RawTick),
    /// Connection lost (may reconnect).
    Disconnected {
        /// The disconnection reason.
        reason: String,
    },
}

impl StreamEvent {
    /// The tick, if this event carries one.
    #[must_use]
    pub const fn tick(&self) -> Option<&RawTick> {
        match self {
            Self::Tick(tick) => Some(tick),
            Self::Disconnected { .. } => None,
        }
    }
}

/// Real-time price stream from a market-data venue.
///
/// Implementations handle the connection, subscription and message parsing
/// for their venue's protocol.
#[async_trait]
pub trait PriceStream: Send {
    /// Connect to the venue's real-time feed.
    async fn connect(&mut self) -> Result<(), Error>;

    /// Subscribe to ticks for the given symbols.
    async fn subscribe(&mut self, symbols: &[String]) -> Result<(), Error>;

    /// Receive the next event.
    ///
    /// Blocks until an event is available. Returns `None` when the stream
    /// is closed.
    async fn next_event(&mut self) -> Option<StreamEvent>;

    /// Venue name for logging.
    fn venue_name(&self) -> &'static str;
}

/// Implement PriceStream for boxed trait objects to allow use with generic wrappers.
#[async_trait]
impl PriceStream for Box<dyn PriceStream> {
    async fn connect(&mut self) -> Result<(), Error> {
        (**self).connect().await
    }

    async fn subscribe(&mut self, symbols: &[String]) -> Result<(), Error> {
        (**self).subscribe(symbols).await
    }

    async fn next_event(&mut self) -> Option<StreamEvent> {
        (**self).next_event().await
    }

    fn venue_name(&self) -> &'static str {
        (**self).venue_name()
    }
}
