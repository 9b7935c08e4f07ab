use std::sync::Arc;

use parking_lot::Mutex;
use tierwatch::port::{AlertEvent, Event, Notifier};

/// Thread-safe event collector for notification assertions in tests.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Tier alerts received so far, in order.
    pub fn alerts(&self) -> Vec<AlertEvent> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                Event::TierAlert(alert) => Some(alert.clone()),
                Event::Test => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: Event) {
        self.events.lock().push(event);
    }
}
