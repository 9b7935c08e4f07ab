//! Binance futures WebSocket message types.
//!
//! Mini-ticker frames arrive as single JSON objects:
//! ```json
//! {"e":"24hrMiniTicker","E":1700000000000,"s":"XPLUSDT","c":"0.9123","o":"0.8","h":"1.0","l":"0.7","v":"1","q":"1"}
//! ```
//! Subscription requests are answered with `{"result":null,"id":1}` or an
//! error object carrying the same `id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::price::RawTick;

/// Stream name for the mini-ticker of `symbol`.
#[must_use]
pub fn mini_ticker_stream(symbol: &str) -> String {
    format!("{}@miniTicker", symbol.to_ascii_lowercase())
}

/// Subscription request sent over an open connection.
#[derive(Debug, Serialize)]
pub struct SubscribeRequest {
    pub method: &'static str,
    pub params: Vec<String>,
    pub id: u64,
}

impl SubscribeRequest {
    pub fn new(streams: Vec<String>, id: u64) -> Self {
        Self {
            method: "SUBSCRIBE",
            params: streams,
            id,
        }
    }
}

/// Messages received from the Binance WebSocket.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BinanceWsMessage {
    MiniTicker(MiniTickerMessage),
    Response(ResponseMessage),
    /// Anything else (other event types, heartbeats).
    Unknown(serde_json::Value),
}

/// `24hrMiniTicker` event. Only the fields the monitor uses are kept.
#[derive(Debug, Deserialize)]
pub struct MiniTickerMessage {
    #[serde(rename = "e")]
    pub event_type: String,
    /// Event time, milliseconds since the epoch.
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    /// Close (last) price, as a decimal string.
    #[serde(rename = "c")]
    pub close: String,
}

impl MiniTickerMessage {
    /// Convert to an unvalidated domain tick.
    #[must_use]
    pub fn to_raw_tick(&self) -> RawTick {
        let tick = RawTick::new(self.symbol.to_ascii_lowercase(), self.close.clone());
        match DateTime::<Utc>::from_timestamp_millis(self.event_time) {
            Some(at) => tick.with_event_time(at),
            None => tick,
        }
    }
}

/// Reply to a request such as SUBSCRIBE.
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub id: u64,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: i64,
    pub msg: String,
}
