//! Message formatting for Telegram notifications.

use crate::port::outbound::notifier::Event;

/// Render an event as a plain-text Telegram message.
pub fn format_event_message(event: &Event) -> String {
    match event {
        Event::TierAlert(e) => format!(
            "🚨 {} entered {}\n\
            \n\
            Price: {}\n\
            Alerts left in tier: {}\n\
            At: {}",
            e.symbol.to_ascii_uppercase(),
            e.tier,
            e.price,
            e.remaining,
            e.at.format("%Y-%m-%d %H:%M:%S UTC"),
        ),
        Event::Test => "✅ tierwatch test notification".to_string(),
    }
}
