//! Reconnecting wrapper for PriceStream.
//!
//! Any [`PriceStream`] can be wrapped to survive dropped connections: the
//! wrapper backs off exponentially (with jitter), opens a circuit breaker
//! after repeated failures, resubscribes the tracked symbols once back, and
//! drops ticks that are not newer than the last one delivered for their
//! symbol. Consumers never see a `Disconnected` event.

use std::collections::HashMap;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::domain::price::RawTick;
use crate::error::Error;
use crate::infrastructure::config::reconnection::ReconnectionConfig;
use crate::port::outbound::stream::{PriceStream, StreamEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CircuitState {
    Closed,
    /// Reconnection blocked until `until`.
    Open { until: Instant },
}

/// Exponential backoff with a circuit breaker.
#[derive(Debug)]
struct Backoff {
    config: ReconnectionConfig,
    failures: u32,
    delay_ms: u64,
    circuit: CircuitState,
}

impl Backoff {
    fn new(config: ReconnectionConfig) -> Self {
        Self {
            failures: 0,
            delay_ms: config.initial_delay_ms,
            circuit: CircuitState::Closed,
            config,
        }
    }

    fn reset(&mut self) {
        self.failures = 0;
        self.delay_ms = self.config.initial_delay_ms;
        self.circuit = CircuitState::Closed;
    }

    /// Current delay plus jitter. Grows the delay for the next call.
    fn next_delay(&mut self) -> Duration {
        let base = self.delay_ms;
        let grown = (base as f64 * self.config.backoff_multiplier) as u64;
        self.delay_ms = grown.min(self.config.max_delay_ms);
        Duration::from_millis(base + jitter_ms(base))
    }

    /// Count a failure, opening the circuit once the limit is reached.
    fn record_failure(&mut self) {
        self.failures += 1;
        if self.failures < self.config.max_consecutive_failures {
            return;
        }
        let cooldown = self.config.circuit_cooldown();
        self.circuit = CircuitState::Open {
            until: Instant::now() + cooldown,
        };
        error!(
            failures = self.failures,
            cooldown_secs = cooldown.as_secs(),
            "Circuit breaker tripped, pausing reconnection attempts"
        );
    }

    /// Time left before the circuit closes, `None` if attempts are allowed.
    ///
    /// An expired circuit is closed and the backoff reset.
    fn blocked_for(&mut self) -> Option<Duration> {
        let CircuitState::Open { until } = self.circuit else {
            return None;
        };
        let now = Instant::now();
        if now >= until {
            info!("Circuit breaker cooldown expired, allowing reconnection");
            self.reset();
            return None;
        }
        Some(until - now)
    }
}

/// Up to 20% of `base_ms`, drawn from the clock's sub-second nanos.
fn jitter_ms(base_ms: u64) -> u64 {
    let range = base_ms / 5;
    if range == 0 {
        return 0;
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    u64::from(nanos) % (range + 1)
}

/// Wrapper that adds automatic reconnection to any [`PriceStream`].
pub struct ReconnectingPriceStream<S: PriceStream> {
    inner: S,
    backoff: Backoff,
    /// Symbols to resubscribe after reconnection.
    subscribed_symbols: Vec<String>,
    /// Event time of the last tick delivered, per symbol.
    last_delivered: HashMap<String, DateTime<Utc>>,
    connected: bool,
}

impl<S: PriceStream> ReconnectingPriceStream<S> {
    /// Wrap `inner`. Starts disconnected; call
    /// [`connect`](PriceStream::connect) before reading events.
    pub fn new(inner: S, config: ReconnectionConfig) -> Self {
        Self {
            inner,
            backoff: Backoff::new(config),
            subscribed_symbols: Vec::new(),
            last_delivered: HashMap::new(),
            connected: false,
        }
    }

    fn mark_lost(&mut self) {
        self.connected = false;
        self.backoff.record_failure();
    }

    /// Wait out the backoff, reconnect and resubscribe.
    async fn reconnect(&mut self) -> Result<(), Error> {
        if let Some(remaining) = self.backoff.blocked_for() {
            warn!(
                remaining_secs = remaining.as_secs(),
                "Circuit breaker open, waiting for cooldown"
            );
            sleep(remaining).await;
            self.backoff.reset();
        }

        let delay = self.backoff.next_delay();
        info!(
            venue = self.inner.venue_name(),
            delay_ms = delay.as_millis() as u64,
            attempt = self.backoff.failures + 1,
            "Reconnecting after delay"
        );
        sleep(delay).await;

        if let Err(e) = self.inner.connect().await {
            error!(error = %e, "Reconnection failed");
            self.mark_lost();
            return Err(e);
        }
        info!(venue = self.inner.venue_name(), "Reconnected");
        self.connected = true;

        if !self.subscribed_symbols.is_empty() {
            debug!(symbols = ?self.subscribed_symbols, "Resubscribing");
            if let Err(e) = self.inner.subscribe(&self.subscribed_symbols).await {
                error!(error = %e, "Resubscribe failed after reconnect");
                self.mark_lost();
                return Err(e);
            }
        }

        self.backoff.reset();
        Ok(())
    }

    /// Whether `tick` is newer than the last tick delivered for its symbol.
    ///
    /// Ticks without a venue timestamp cannot be ordered and always pass.
    fn admit(&mut self, tick: &RawTick) -> bool {
        let Some(event_time) = tick.event_time else {
            return true;
        };
        match self.last_delivered.get(&tick.symbol) {
            Some(last) if event_time <= *last => {
                debug!(
                    symbol = %tick.symbol,
                    event_time = %event_time,
                    last_delivered = %last,
                    "Dropping stale or duplicate tick"
                );
                false
            }
            _ => {
                self.last_delivered.insert(tick.symbol.clone(), event_time);
                true
            }
        }
    }
}

#[async_trait]
impl<S: PriceStream> PriceStream for ReconnectingPriceStream<S> {
    async fn connect(&mut self) -> Result<(), Error> {
        self.inner.connect().await?;
        self.connected = true;
        self.backoff.reset();
        Ok(())
    }

    async fn subscribe(&mut self, symbols: &[String]) -> Result<(), Error> {
        self.subscribed_symbols = symbols.to_vec();
        self.inner.subscribe(symbols).await
    }

    async fn next_event(&mut self) -> Option<StreamEvent> {
        loop {
            if !self.connected {
                if let Err(e) = self.reconnect().await {
                    warn!(error = %e, "Reconnection attempt failed, will retry");
                    continue;
                }
            }

            let tick = match self.inner.next_event().await {
                Some(StreamEvent::Tick(tick)) => tick,
                Some(StreamEvent::Disconnected { reason }) => {
                    warn!(reason = %reason, "Connection lost, will reconnect");
                    self.mark_lost();
                    continue;
                }
                None => {
                    warn!("Price stream ended unexpectedly, will reconnect");
                    self.mark_lost();
                    continue;
                }
            };

            if self.backoff.failures > 0 {
                self.backoff.reset();
            }
            if self.admit(&tick) {
                return Some(StreamEvent::Tick(tick));
            }
        }
    }

    fn venue_name(&self) -> &'static str {
        self.inner.venue_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::error::Error;
    use crate::testkit;
    use crate::testkit::stream::ScriptedStream;

    fn backoff_config() -> ReconnectionConfig {
        ReconnectionConfig {
            initial_delay_ms: 10,
            max_delay_ms: 100,
            backoff_multiplier: 2.0,
            max_consecutive_failures: 3,
            circuit_breaker_cooldown_ms: 50,
        }
    }

    fn fast_config() -> ReconnectionConfig {
        ReconnectionConfig {
            initial_delay_ms: 1,
            max_delay_ms: 10,
            backoff_multiplier: 2.0,
            max_consecutive_failures: 3,
            circuit_breaker_cooldown_ms: 10,
        }
    }

    fn symbols() -> Vec<String> {
        vec!["xplusdt".to_string()]
    }

    #[tokio::test]
    async fn test_successful_connection() {
        let mock = ScriptedStream::new().with_events(vec![Some(testkit::domain::tick_event(
            "xplusdt", "1.0", 1,
        ))]);

        let mut stream = ReconnectingPriceStream::new(mock, backoff_config());
        stream.connect().await.unwrap();

        let event = stream.next_event().await;
        assert!(matches!(event, Some(StreamEvent::Tick(_))));
    }

    #[tokio::test]
    async fn test_reconnect_after_disconnect_resubscribes() {
        let mock = ScriptedStream::new().with_events(vec![
            Some(testkit::domain::disconnect_event("connection lost")),
            Some(testkit::domain::tick_event("xplusdt", "1.0", 1)),
        ]);
        let (connect_count, subscribe_count) = mock.counts();

        let mut stream = ReconnectingPriceStream::new(mock, fast_config());
        stream.connect().await.unwrap();
        stream.subscribe(&symbols()).await.unwrap();

        let event = stream.next_event().await;
        assert!(matches!(event, Some(StreamEvent::Tick(_))));

        assert_eq!(connect_count.load(Ordering::SeqCst), 2);
        assert_eq!(subscribe_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_disconnect_is_never_surfaced() {
        let mock = ScriptedStream::new().with_events(vec![
            Some(testkit::domain::disconnect_event("a")),
            Some(testkit::domain::disconnect_event("b")),
            Some(testkit::domain::tick_event("xplusdt", "2.0", 1)),
        ]);

        let mut stream = ReconnectingPriceStream::new(mock, fast_config());
        stream.connect().await.unwrap();

        let event = stream.next_event().await.unwrap();
        assert_eq!(event.tick().unwrap().price, "2.0");
    }

    #[tokio::test]
    async fn test_replayed_ticks_are_dropped() {
        let mock = ScriptedStream::new().with_events(vec![
            Some(testkit::domain::tick_event("xplusdt", "1.0", 100)),
            Some(testkit::domain::disconnect_event("reset")),
            // Replay of the last frame and an older one after reconnect.
            Some(testkit::domain::tick_event("xplusdt", "1.0", 100)),
            Some(testkit::domain::tick_event("xplusdt", "0.8", 50)),
            Some(testkit::domain::tick_event("xplusdt", "1.1", 101)),
        ]);

        let mut stream = ReconnectingPriceStream::new(mock, fast_config());
        stream.connect().await.unwrap();

        let first = stream.next_event().await.unwrap();
        assert_eq!(first.tick().unwrap().price, "1.0");

        let second = stream.next_event().await.unwrap();
        assert_eq!(second.tick().unwrap().price, "1.1");
    }

    #[tokio::test]
    async fn test_stale_guard_is_per_symbol() {
        let mock = ScriptedStream::new().with_events(vec![
            Some(testkit::domain::tick_event("aaa", "1.0", 100)),
            Some(testkit::domain::tick_event("bbb", "2.0", 50)),
        ]);

        let mut stream = ReconnectingPriceStream::new(mock, fast_config());
        stream.connect().await.unwrap();

        assert_eq!(stream.next_event().await.unwrap().tick().unwrap().symbol, "aaa");
        assert_eq!(stream.next_event().await.unwrap().tick().unwrap().symbol, "bbb");
    }

    #[tokio::test]
    async fn test_ticks_without_event_time_always_pass() {
        let mock = ScriptedStream::new().with_events(vec![
            Some(StreamEvent::Tick(RawTick::new("xplusdt", "1.0"))),
            Some(StreamEvent::Tick(RawTick::new("xplusdt", "1.0"))),
        ]);

        let mut stream = ReconnectingPriceStream::new(mock, fast_config());
        stream.connect().await.unwrap();

        assert!(stream.next_event().await.is_some());
        assert!(stream.next_event().await.is_some());
    }

    #[test]
    fn test_backoff_grows_to_the_cap() {
        let mut backoff = Backoff::new(backoff_config());

        for base_ms in [10, 20, 40, 80, 100, 100] {
            let delay_ms = backoff.next_delay().as_millis() as u64;
            let max_ms = base_ms + base_ms / 5;
            assert!(
                (base_ms..=max_ms).contains(&delay_ms),
                "delay {delay_ms}ms not within {base_ms}..={max_ms}"
            );
        }
    }

    #[test]
    fn test_jitter_is_bounded() {
        for _ in 0..50 {
            assert!(jitter_ms(100) <= 20);
        }
        assert_eq!(jitter_ms(4), 0);
    }

    #[test]
    fn test_circuit_opens_after_max_failures() {
        let mut backoff = Backoff::new(backoff_config());

        backoff.record_failure();
        backoff.record_failure();
        assert!(backoff.blocked_for().is_none());

        backoff.record_failure();
        assert!(matches!(backoff.circuit, CircuitState::Open { .. }));
        assert!(backoff.blocked_for().is_some());
    }

    #[tokio::test]
    async fn test_circuit_closes_after_cooldown() {
        let mut backoff = Backoff::new(ReconnectionConfig {
            max_consecutive_failures: 2,
            circuit_breaker_cooldown_ms: 10,
            ..fast_config()
        });
        backoff.record_failure();
        backoff.record_failure();
        assert!(backoff.blocked_for().is_some());

        tokio::time::sleep(Duration::from_millis(15)).await;

        assert!(backoff.blocked_for().is_none());
        assert_eq!(backoff.circuit, CircuitState::Closed);
        assert_eq!(backoff.failures, 0);
    }

    #[test]
    fn test_reset_restores_initial_delay() {
        let mut backoff = Backoff::new(backoff_config());
        backoff.next_delay();
        backoff.next_delay();
        backoff.failures = 5;

        backoff.reset();

        assert_eq!(backoff.failures, 0);
        assert_eq!(backoff.delay_ms, 10);
        assert_eq!(backoff.circuit, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_subscribe_replaces_previous_symbols() {
        let mut stream = ReconnectingPriceStream::new(ScriptedStream::new(), backoff_config());

        stream.subscribe(&["old".to_string()]).await.unwrap();
        stream.subscribe(&["new".to_string()]).await.unwrap();

        assert_eq!(stream.subscribed_symbols, vec!["new".to_string()]);
    }

    #[tokio::test]
    async fn test_connect_failure_does_not_set_connected() {
        let mock = ScriptedStream::new()
            .with_connect_results(vec![Err(Error::Connection("test failure".to_string()))]);

        let mut stream = ReconnectingPriceStream::new(mock, backoff_config());

        assert!(stream.connect().await.is_err());
        assert!(!stream.connected);
    }

    #[tokio::test]
    async fn test_failed_reconnect_is_retried() {
        let mock = ScriptedStream::new()
            .with_connect_results(vec![
                Ok(()),
                Err(Error::Connection("refused".to_string())),
                Ok(()),
            ])
            .with_events(vec![
                Some(testkit::domain::disconnect_event("drop")),
                Some(testkit::domain::tick_event("xplusdt", "1.0", 1)),
            ]);
        let (connect_count, _) = mock.counts();

        let mut stream = ReconnectingPriceStream::new(mock, fast_config());
        stream.connect().await.unwrap();

        assert!(stream.next_event().await.is_some());
        assert_eq!(connect_count.load(Ordering::SeqCst), 3);
        assert_eq!(stream.backoff.failures, 0);
    }

    #[test]
    fn test_venue_name_delegates_to_inner() {
        let stream = ReconnectingPriceStream::new(ScriptedStream::new(), backoff_config());
        assert_eq!(stream.venue_name(), "mock");
    }
}
