//! Configuration file resolution.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Config file used when `--config` is not given.
pub fn default_config() -> PathBuf {
    PathBuf::from("config.toml")
}

/// Load the explicit config file, or `./config.toml` if it exists, or the
/// built-in defaults.
///
/// Environment overrides apply in every case.
#[allow(clippy::result_large_err)]
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => Config::load(path),
        None => {
            let fallback = default_config();
            if fallback.is_file() {
                Config::load(fallback)
            } else {
                Config::parse_toml("")
            }
        }
    }
}
