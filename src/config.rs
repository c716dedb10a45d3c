//! Process-wide defaults for the runtime, loaded from an optional
//! `bees.toml` if one is present in the current directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::BeesResult;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// How long a finished run's state (registry entry, event log) is kept
    /// around for late subscribers before cleanup.
    pub grace_window: Duration,
    /// Default virtual-user count when a start request omits `users`.
    pub default_users: u32,
    /// Hard cap on the ramp-up window.
    pub max_cold_start: Duration,
    /// Default `tracing` env-filter when `BEES_LOG`/`RUST_LOG` are unset.
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            grace_window: Duration::from_secs(1800),
            default_users: 10,
            max_cold_start: Duration::from_secs(20),
            log_filter: "info".to_owned(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    grace_window_secs: Option<u64>,
    default_users: Option<u32>,
    max_cold_start_secs: Option<u64>,
    log_filter: Option<String>,
}

/// Loads `RuntimeConfig` from `path`, or from `bees.toml` in the current
/// directory when `path` is `None` and that file exists, or the built-in
/// defaults otherwise.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> BeesResult<RuntimeConfig> {
    let candidate = path.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("bees.toml"));
    if !candidate.exists() {
        return Ok(RuntimeConfig::default());
    }

    let content = std::fs::read_to_string(&candidate)?;
    let file: ConfigFile = toml::from_str(&content)?;
    let defaults = RuntimeConfig::default();

    Ok(RuntimeConfig {
        grace_window: file
            .grace_window_secs
            .map_or(defaults.grace_window, Duration::from_secs),
        default_users: file.default_users.unwrap_or(defaults.default_users),
        max_cold_start: file
            .max_cold_start_secs
            .map_or(defaults.max_cold_start, Duration::from_secs),
        log_filter: file.log_filter.unwrap_or(defaults.log_filter),
    })
}
