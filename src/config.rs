use log::warn;
use serde::Deserialize;
use std::env;

pub const MAX_SLOTS_ENV: &str = "SCHEDULER_MAX_SLOTS";
pub const MAX_DURATION_ENV: &str = "SCHEDULER_MAX_DURATION_MINUTES";
pub const MAX_WINDOW_ENV: &str = "SCHEDULER_MAX_WINDOW_MINUTES";

/// Limits applied to incoming write requests
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Most windows accepted in a single request.
    /// 168 one-hour windows cover a full week.
    pub max_slots_per_request: usize,
    /// Longest meeting duration an event may declare
    pub max_duration_minutes: u32,
    /// Longest single window a request may carry. Bounds how many frames one
    /// window decomposes into.
    pub max_window_minutes: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_slots_per_request: 168,
            max_duration_minutes: 1440,
            max_window_minutes: 10_080,
        }
    }
}

impl EngineConfig {
    /// Reads limits from the environment. Missing or unparseable values keep
    /// their defaults.
    pub fn from_env() -> Self {
        let defaults = EngineConfig::default();

        EngineConfig {
            max_slots_per_request: read_var(MAX_SLOTS_ENV)
                .unwrap_or(defaults.max_slots_per_request),
            max_duration_minutes: read_var(MAX_DURATION_ENV)
                .unwrap_or(defaults.max_duration_minutes),
            max_window_minutes: read_var(MAX_WINDOW_ENV).unwrap_or(defaults.max_window_minutes),
        }
    }
}

fn read_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}, not a valid number", name, raw);
            None
        }
    }
}
