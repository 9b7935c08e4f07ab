//! Manually driven [`Clock`] for deterministic cooldown and reset tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::RwLock;

use crate::port::outbound::clock::Clock;

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(start)),
        }
    }

    /// A clock starting at the Unix epoch, so `at_secs(n)` reads as `t = n s`.
    pub fn at_epoch() -> Self {
        Self::new(epoch())
    }

    pub fn set(&self, time: DateTime<Utc>) {
        *self.now.write() = time;
    }

    /// Jump to `secs` seconds after the epoch.
    pub fn set_secs(&self, secs: i64) {
        self.set(at_secs(secs));
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::at_epoch()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

/// The Unix epoch.
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// `secs` seconds after the Unix epoch.
pub fn at_secs(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_else(epoch)
}
