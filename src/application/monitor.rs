//! Monitor lifecycle: one consumer task feeding ticks through the engine.
//!
//! The monitor owns the [`AlertEngine`] and hands it to a single spawned task
//! while running, so ticks are evaluated strictly one at a time. Alerts are
//! handed to the notifier registry without waiting for delivery. The engine
//! is returned when the task finishes, so budgets and timestamps survive a
//! stop/start cycle.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::engine::{AlertEngine, Decision};
use crate::domain::price::{Price, RawTick};
use crate::error::{Error, Result};
use crate::port::outbound::clock::Clock;
use crate::port::outbound::notifier::{AlertEvent, Event, NotifierRegistry};
use crate::port::outbound::stream::{PriceStream, StreamEvent};

/// Counters kept by the consumer task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorStats {
    /// Ticks evaluated by the engine.
    pub ticks: u64,
    /// Ticks discarded for an invalid price.
    pub rejected: u64,
    /// Ticks for a symbol other than the monitored one.
    pub ignored: u64,
    pub alerts: u64,
    pub suppressed: u64,
    pub last_price: Option<Price>,
}

struct Running {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<(AlertEngine, MonitorStats)>,
}

/// Tiered price monitor for a single symbol.
pub struct Monitor {
    /// `None` while the consumer task holds it.
    engine: Option<AlertEngine>,
    /// Used to rebuild the engine if the consumer task panicked.
    fallback: AlertEngine,
    clock: Arc<dyn Clock>,
    notifiers: Arc<NotifierRegistry>,
    symbol: String,
    running: Option<Running>,
}

impl Monitor {
    pub fn new(
        engine: AlertEngine,
        clock: Arc<dyn Clock>,
        notifiers: Arc<NotifierRegistry>,
        symbol: impl Into<String>,
    ) -> Self {
        let fallback = AlertEngine::new(Arc::new(engine.table().clone()));
        Self {
            engine: Some(engine),
            fallback,
            clock,
            notifiers,
            symbol: symbol.into().to_ascii_lowercase(),
            running: None,
        }
    }

    /// Monitored symbol, lowercase.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Whether the consumer task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }

    /// The engine, when the monitor is stopped.
    #[must_use]
    pub fn engine(&self) -> Option<&AlertEngine> {
        self.engine.as_ref()
    }

    /// Connect, subscribe and start consuming ticks.
    ///
    /// Calling `start` while running logs a warning and leaves the existing
    /// subscription untouched; `stream` is dropped unopened.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Startup`] if the stream cannot connect or subscribe.
    /// The monitor stays stopped in that case.
    pub async fn start(&mut self, mut stream: Box<dyn PriceStream>) -> Result<()> {
        if self.is_running() {
            warn!(symbol = %self.symbol, "Monitor already running, ignoring start");
            return Ok(());
        }
        // A task that ended on its own still holds the engine.
        self.reap().await;

        let venue = stream.venue_name();
        info!(symbol = %self.symbol, venue, "Starting monitor");

        stream
            .connect()
            .await
            .map_err(|e| Error::Startup(format!("failed to connect to {venue}: {e}")))?;
        stream
            .subscribe(std::slice::from_ref(&self.symbol))
            .await
            .map_err(|e| Error::Startup(format!("failed to subscribe to {}: {e}", self.symbol)))?;

        let Some(engine) = self.engine.take() else {
            return Err(Error::Startup("alert engine unavailable".into()));
        };

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(consume(
            stream,
            engine,
            Arc::clone(&self.clock),
            Arc::clone(&self.notifiers),
            self.symbol.clone(),
            shutdown_rx,
        ));
        self.running = Some(Running {
            shutdown: shutdown_tx,
            handle,
        });

        info!(symbol = %self.symbol, venue, "Monitor started");
        Ok(())
    }

    /// Stop consuming and close the stream.
    ///
    /// Returns the consumer's counters, or `None` with a warning when the
    /// monitor was not running.
    pub async fn stop(&mut self) -> Option<MonitorStats> {
        if !self.is_running() {
            // The stream may have ended on its own.
            self.reap().await;
            warn!(symbol = %self.symbol, "Monitor not running, ignoring stop");
            return None;
        }
        let Some(running) = self.running.take() else {
            return None;
        };

        let _ = running.shutdown.send(true);
        let stats = self.join(running.handle).await;
        info!(
            symbol = %self.symbol,
            ticks = stats.ticks,
            rejected = stats.rejected,
            alerts = stats.alerts,
            suppressed = stats.suppressed,
            "Monitor stopped"
        );
        Some(stats)
    }

    /// Collect a consumer task that already exited.
    async fn reap(&mut self) {
        if let Some(running) = self.running.take() {
            let stats = self.join(running.handle).await;
            debug!(ticks = stats.ticks, "Collected finished consumer task");
        }
    }

    async fn join(&mut self, handle: JoinHandle<(AlertEngine, MonitorStats)>) -> MonitorStats {
        match handle.await {
            Ok((engine, stats)) => {
                self.engine = Some(engine);
                stats
            }
            Err(e) => {
                error!(error = %e, "Consumer task failed, alert state reset");
                self.engine = Some(self.fallback.clone());
                MonitorStats::default()
            }
        }
    }
}

async fn consume(
    mut stream: Box<dyn PriceStream>,
    mut engine: AlertEngine,
    clock: Arc<dyn Clock>,
    notifiers: Arc<NotifierRegistry>,
    symbol: String,
    mut shutdown: watch::Receiver<bool>,
) -> (AlertEngine, MonitorStats) {
    let mut stats = MonitorStats::default();

    loop {
        tokio::select! {
            biased;
            result = shutdown.changed() => {
                if result.is_err() || *shutdown.borrow() {
                    debug!("Shutdown signal received");
                    break;
                }
            }
            event = stream.next_event() => {
                match event {
                    Some(StreamEvent::Tick(raw)) => {
                        handle_tick(&raw, &mut engine, clock.as_ref(), &notifiers, &symbol, &mut stats);
                    }
                    Some(StreamEvent::Disconnected { reason }) => {
                        warn!(reason = %reason, "Price stream disconnected");
                    }
                    None => {
                        warn!("Price stream ended");
                        break;
                    }
                }
            }
        }
    }

    drop(stream);
    (engine, stats)
}

fn handle_tick(
    raw: &RawTick,
    engine: &mut AlertEngine,
    clock: &dyn Clock,
    notifiers: &NotifierRegistry,
    symbol: &str,
    stats: &mut MonitorStats,
) {
    if !raw.symbol.eq_ignore_ascii_case(symbol) {
        debug!(symbol = %raw.symbol, "Ignoring tick for another symbol");
        stats.ignored += 1;
        return;
    }

    let tick = match raw.validate() {
        Ok(tick) => tick,
        Err(e) => {
            warn!(symbol = %raw.symbol, raw_price = %raw.price, error = %e, "Rejected tick");
            stats.rejected += 1;
            return;
        }
    };

    let now = clock.now();
    let decision = engine.evaluate(tick.price, now);
    stats.ticks += 1;
    stats.last_price = Some(tick.price);

    match decision {
        Decision::Send(alert) => {
            stats.alerts += 1;
            notifiers.notify_all(Event::TierAlert(AlertEvent::new(symbol, &alert)));
        }
        Decision::Suppress(suppression) => {
            stats.suppressed += 1;
            debug!(
                price = %tick.price,
                reason = %suppression.reason,
                "Alert suppressed"
            );
        }
    }
    info!(symbol, price = %tick.price, "Latest price");
}
