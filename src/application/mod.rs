//! Application services that drive the domain through ports.

pub mod monitor;

pub use monitor::{Monitor, MonitorStats};
