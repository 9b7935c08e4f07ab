//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`exchange`] - Reconnection on top of venue streams
//! - [`shutdown`] - Signal handling and process setup

pub mod bootstrap;
pub mod config;
pub mod exchange;
pub mod shutdown;
