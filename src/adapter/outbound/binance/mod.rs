//! Binance futures market-data integration.

pub mod dto;
pub mod stream;

pub use stream::{BinanceTickerStream, DEFAULT_WS_URL};
