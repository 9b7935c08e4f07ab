//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the monitor's infrastructure dependencies: the
//! price feed, alert delivery and the clock.

pub mod clock;
pub mod notifier;
pub mod stream;
