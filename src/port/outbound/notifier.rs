//! Notifier port for alert delivery.
//!
//! This module defines the trait for delivering alerts raised by the engine
//! to external channels (webhooks, chat bots, logs). Delivery is
//! best-effort: failures are logged by the adapter and never reach the
//! engine.

use chrono::{DateTime, Utc};

use crate::domain::engine::Alert;
use crate::domain::price::Price;

/// Events that can trigger notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Price entered a tier with budget left and no cooldown active.
    TierAlert(AlertEvent),
    /// Manual delivery check (`tierwatch check webhook`).
    Test,
}

/// Alert payload handed to notifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEvent {
    /// Monitored symbol.
    pub symbol: String,
    /// Tier name, as configured.
    pub tier: String,
    /// Price that triggered the alert.
    pub price: Price,
    /// Alerts left in the tier after this one.
    pub remaining: u32,
    /// Decision time.
    pub at: DateTime<Utc>,
}

impl AlertEvent {
    /// Build the payload for an engine alert on `symbol`.
    #[must_use]
    pub fn new(symbol: &str, alert: &Alert) -> Self {
        Self {
            symbol: symbol.to_string(),
            tier: alert.tier_name.clone(),
            price: alert.price,
            remaining: alert.remaining,
            at: alert.at,
        }
    }
}

/// Trait for notification handlers.
///
/// Notifications are fire-and-forget.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - The `notify` method must not block or perform slow I/O synchronously
/// - Spawn or hand off to a worker task for network delivery
pub trait Notifier: Send + Sync {
    /// Handle an event.
    fn notify(&self, event: Event);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Notify all registered notifiers.
    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A no-op notifier for testing or when notifications are disabled.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}

/// A logging notifier that logs events via tracing.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        use tracing::info;
        match event {
            Event::TierAlert(e) => {
                info!(
                    symbol = %e.symbol,
                    tier = %e.tier,
                    price = %e.price,
                    remaining = e.remaining,
                    "ALERT: price entered tier"
                );
            }
            Event::Test => {
                info!("Test notification");
            }
        }
    }
}
