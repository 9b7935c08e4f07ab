//! Binance USD-M futures mini-ticker stream.
//!
//! # Connection Lifecycle
//!
//! 1. **Connection**: `connect()` opens the raw-stream endpoint (`/ws`)
//! 2. **Subscription**: `subscribe()` sends a `SUBSCRIBE` request for
//!    `<symbol>@miniTicker`
//! 3. **Message Loop**: `next_event()` yields one tick per mini-ticker frame
//!
//! The stream never reconnects on its own. Wrap it in
//! [`ReconnectingPriceStream`](crate::infrastructure::exchange::ReconnectingPriceStream)
//! for that.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace, warn};

use super::dto::{mini_ticker_stream, BinanceWsMessage, SubscribeRequest};
use crate::error::{Error, Result};
use crate::port::outbound::stream::{PriceStream, StreamEvent};

/// Default USD-M futures endpoint.
pub const DEFAULT_WS_URL: &str = "wss://fstream.binance.com/ws";

/// Mini-ticker stream implementing [`PriceStream`].
pub struct BinanceTickerStream {
    url: String,
    ws: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    /// Id of the next request; replies echo it back.
    next_request_id: u64,
}

impl BinanceTickerStream {
    /// Create a new, disconnected stream for the given WebSocket URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ws: None,
            next_request_id: 1,
        }
    }

    /// Whether a connection is currently open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.ws.is_some()
    }

    /// Interpret one text frame.
    fn handle_text(text: &str) -> Option<StreamEvent> {
        match serde_json::from_str::<BinanceWsMessage>(text) {
            Ok(BinanceWsMessage::MiniTicker(ticker)) => {
                trace!(symbol = %ticker.symbol, price = %ticker.close, "Mini-ticker");
                Some(StreamEvent::Tick(ticker.to_raw_tick()))
            }
            Ok(BinanceWsMessage::Response(response)) => {
                match response.error {
                    Some(err) => warn!(
                        id = response.id,
                        code = err.code,
                        msg = %err.msg,
                        "Request rejected by venue"
                    ),
                    None => debug!(id = response.id, "Request acknowledged"),
                }
                None
            }
            Ok(BinanceWsMessage::Unknown(_)) => None,
            Err(e) => {
                warn!(error = %e, bytes = text.len(), "Failed to parse message");
                None
            }
        }
    }
}

#[async_trait]
impl PriceStream for BinanceTickerStream {
    async fn connect(&mut self) -> Result<()> {
        info!(url = %self.url, "Connecting to WebSocket");
        let (ws_stream, response) = connect_async(self.url.as_str()).await?;
        info!(status = %response.status(), "WebSocket connected");
        self.ws = Some(ws_stream);
        Ok(())
    }

    async fn subscribe(&mut self, symbols: &[String]) -> Result<()> {
        let ws = self
            .ws
            .as_mut()
            .ok_or_else(|| Error::Connection("Not connected".into()))?;

        let streams: Vec<String> = symbols.iter().map(|s| mini_ticker_stream(s)).collect();
        let request = SubscribeRequest::new(streams, self.next_request_id);
        self.next_request_id += 1;
        let json = serde_json::to_string(&request)?;

        info!(streams = ?request.params, id = request.id, "Subscribing");
        ws.send(Message::Text(json)).await?;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<StreamEvent> {
        let ws = self.ws.as_mut()?;

        loop {
            let frame = match ws.next().await {
                Some(frame) => frame,
                None => {
                    self.ws = None;
                    return Some(StreamEvent::Disconnected {
                        reason: "stream ended".into(),
                    });
                }
            };
            match frame {
                Ok(Message::Text(text)) => {
                    if let Some(event) = Self::handle_text(&text) {
                        return Some(event);
                    }
                }
                Ok(Message::Ping(data)) => {
                    trace!("Received WebSocket ping");
                    if ws.send(Message::Pong(data)).await.is_err() {
                        self.ws = None;
                        return Some(StreamEvent::Disconnected {
                            reason: "Failed to send pong".into(),
                        });
                    }
                }
                Ok(Message::Close(frame)) => {
                    info!(frame = ?frame, "WebSocket closed by server");
                    self.ws = None;
                    return Some(StreamEvent::Disconnected {
                        reason: frame.map(|f| f.reason.to_string()).unwrap_or_default(),
                    });
                }
                Ok(_) => continue,
                Err(e) => {
                    error!(error = %e, "WebSocket error");
                    self.ws = None;
                    return Some(StreamEvent::Disconnected {
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    fn venue_name(&self) -> &'static str {
        "Binance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::binance::dto::MiniTickerMessage;
    use chrono::{TimeZone, Utc};

    #[test]
    fn new_stream_is_disconnected() {
        let stream = BinanceTickerStream::new(DEFAULT_WS_URL);
        assert!(!stream.is_connected());
        assert_eq!(stream.venue_name(), "Binance");
    }

    #[tokio::test]
    async fn subscribe_without_connection_fails() {
        let mut stream = BinanceTickerStream::new(DEFAULT_WS_URL);
        let result = stream.subscribe(&["xplusdt".to_string()]).await;
        assert!(matches!(result, Err(Error::Connection(_))));
    }

    #[tokio::test]
    async fn next_event_without_connection_is_none() {
        let mut stream = BinanceTickerStream::new(DEFAULT_WS_URL);
        assert!(stream.next_event().await.is_none());
    }

    #[test]
    fn subscribe_request_matches_venue_format() {
        let request = SubscribeRequest::new(vec![mini_ticker_stream("XPLUSDT")], 7);
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&request).unwrap()).unwrap();

        assert_eq!(json["method"], "SUBSCRIBE");
        assert_eq!(json["params"][0], "xplusdt@miniTicker");
        assert_eq!(json["id"], 7);
    }

    #[test]
    fn mini_ticker_frame_becomes_tick() {
        let text = r#"{"e":"24hrMiniTicker","E":1700000000123,"s":"XPLUSDT","c":"0.9000","o":"0.8","h":"1.0","l":"0.7","v":"10","q":"9"}"#;

        let event = BinanceTickerStream::handle_text(text).unwrap();
        let tick = event.tick().unwrap();

        assert_eq!(tick.symbol, "xplusdt");
        assert_eq!(tick.price, "0.9000");
        assert_eq!(
            tick.event_time,
            Utc.timestamp_millis_opt(1_700_000_000_123).single()
        );
    }

    #[test]
    fn subscription_ack_yields_nothing() {
        assert!(BinanceTickerStream::handle_text(r#"{"result":null,"id":1}"#).is_none());
    }

    #[test]
    fn subscription_error_yields_nothing() {
        let text = r#"{"error":{"code":2,"msg":"Invalid request"},"id":3}"#;
        match serde_json::from_str::<BinanceWsMessage>(text).unwrap() {
            BinanceWsMessage::Response(response) => {
                assert_eq!(response.id, 3);
                assert_eq!(response.error.unwrap().code, 2);
            }
            other => panic!("expected Response, got {other:?}"),
        }
        assert!(BinanceTickerStream::handle_text(text).is_none());
    }

    #[test]
    fn malformed_or_foreign_frames_are_skipped() {
        assert!(BinanceTickerStream::handle_text("not json").is_none());
        assert!(BinanceTickerStream::handle_text(r#"{"e":"aggTrade","p":"1.0"}"#).is_none());
    }

    #[test]
    fn unparseable_price_is_left_for_validation() {
        let message = MiniTickerMessage {
            event_type: "24hrMiniTicker".into(),
            event_time: 0,
            symbol: "XPLUSDT".into(),
            close: "NaN".into(),
        };
        let tick = message.to_raw_tick();
        assert!(tick.validate().is_err());
    }
}
