//! Mock [`PriceStream`] implementations for testing.
//!
//! - [`ScriptedStream`] - Pre-loaded connect/subscribe results and events.
//!   Best for: error handling, reconnection logic, startup failures.
//!
//! - [`ChannelStream`] - Channel-backed stream with external control handle.
//!   Best for: monitor tests needing precise, on-demand tick delivery.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::port::outbound::stream::{PriceStream, StreamEvent};

// ---------------------------------------------------------------------------
// ScriptedStream
// ---------------------------------------------------------------------------

/// A mock stream with scripted connect/subscribe results and a fixed event queue.
///
/// Each call to `connect()` or `subscribe()` pops the next result from the
/// corresponding queue (defaults to `Ok(())` when exhausted).
pub struct ScriptedStream {
    connect_results: VecDeque<Result<()>>,
    subscribe_results: VecDeque<Result<()>>,
    events: VecDeque<Option<StreamEvent>>,
    connect_count: Arc<AtomicU32>,
    subscribe_count: Arc<AtomicU32>,
}

impl ScriptedStream {
    pub fn new() -> Self {
        Self {
            connect_results: VecDeque::new(),
            subscribe_results: VecDeque::new(),
            events: VecDeque::new(),
            connect_count: Arc::new(AtomicU32::new(0)),
            subscribe_count: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn with_connect_results(mut self, results: Vec<Result<()>>) -> Self {
        self.connect_results = results.into();
        self
    }

    pub fn with_subscribe_results(mut self, results: Vec<Result<()>>) -> Self {
        self.subscribe_results = results.into();
        self
    }

    pub fn with_events(mut self, events: Vec<Option<StreamEvent>>) -> Self {
        self.events = events.into();
        self
    }

    /// Get shared counters for asserting connect/subscribe call counts.
    pub fn counts(&self) -> (Arc<AtomicU32>, Arc<AtomicU32>) {
        (self.connect_count.clone(), self.subscribe_count.clone())
    }
}

impl Default for ScriptedStream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceStream for ScriptedStream {
    async fn connect(&mut self) -> Result<()> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        self.connect_results.pop_front().unwrap_or(Ok(()))
    }

    async fn subscribe(&mut self, _symbols: &[String]) -> Result<()> {
        self.subscribe_count.fetch_add(1, Ordering::SeqCst);
        self.subscribe_results.pop_front().unwrap_or(Ok(()))
    }

    async fn next_event(&mut self) -> Option<StreamEvent> {
        self.events.pop_front().flatten()
    }

    fn venue_name(&self) -> &'static str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// ChannelStream
// ---------------------------------------------------------------------------

/// A mock stream controlled externally via a [`ChannelStreamHandle`].
///
/// Events are sent into the handle and read by the consumer via
/// `next_event()`. Dropping the stream is observable through
/// [`ChannelStreamHandle::is_dropped`].
pub struct ChannelStream {
    event_rx: mpsc::Receiver<Option<StreamEvent>>,
    probe: Arc<Probe>,
}

/// What the consumer did to a [`ChannelStream`].
#[derive(Default)]
struct Probe {
    connects: AtomicU32,
    subscribes: AtomicU32,
    symbols: Mutex<Vec<String>>,
    dropped: AtomicBool,
}

/// Control handle for a [`ChannelStream`].
pub struct ChannelStreamHandle {
    event_tx: mpsc::Sender<Option<StreamEvent>>,
    probe: Arc<Probe>,
}

impl ChannelStreamHandle {
    /// Send an event to the stream.
    pub async fn send(&self, event: StreamEvent) {
        let _ = self.event_tx.send(Some(event)).await;
    }

    /// Signal end-of-stream (causes `next_event` to return `None`).
    pub async fn close(&self) {
        let _ = self.event_tx.send(None).await;
    }

    pub fn connect_count(&self) -> u32 {
        self.probe.connects.load(Ordering::SeqCst)
    }

    pub fn subscribe_count(&self) -> u32 {
        self.probe.subscribes.load(Ordering::SeqCst)
    }

    /// Symbols passed to the last `subscribe()`.
    pub fn subscribed_symbols(&self) -> Vec<String> {
        self.probe.symbols.lock().clone()
    }

    /// Whether the consumer has dropped (closed) the stream.
    pub fn is_dropped(&self) -> bool {
        self.probe.dropped.load(Ordering::SeqCst)
    }
}

/// Create a [`ChannelStream`] and its control [`ChannelStreamHandle`].
pub fn channel_stream(buffer: usize) -> (ChannelStream, ChannelStreamHandle) {
    let (event_tx, event_rx) = mpsc::channel(buffer);
    let probe = Arc::new(Probe::default());
    (
        ChannelStream {
            event_rx,
            probe: Arc::clone(&probe),
        },
        ChannelStreamHandle { event_tx, probe },
    )
}

impl Drop for ChannelStream {
    fn drop(&mut self) {
        self.probe.dropped.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PriceStream for ChannelStream {
    async fn connect(&mut self) -> Result<()> {
        self.probe.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn subscribe(&mut self, symbols: &[String]) -> Result<()> {
        self.probe.subscribes.fetch_add(1, Ordering::SeqCst);
        *self.probe.symbols.lock() = symbols.to_vec();
        Ok(())
    }

    async fn next_event(&mut self) -> Option<StreamEvent> {
        self.event_rx.recv().await.flatten()
    }

    fn venue_name(&self) -> &'static str {
        "mock"
    }
}
