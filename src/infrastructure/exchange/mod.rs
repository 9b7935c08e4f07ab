//! Stream infrastructure shared by all venues.

pub mod reconnecting;

pub use reconnecting::ReconnectingPriceStream;
