//! Configuration sections and loading.

pub mod logging;
pub mod notifier;
pub mod reconnection;
pub mod settings;
pub mod tiers;
