//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for dispatch behaviour.
//!
//! ## Environment Variables
//!
//! ### `SUMMER_SLOW_MATCH_US`
//!
//! Route matches taking longer than this many microseconds are logged at WARN.
//!
//! Default: `1000` (1 ms)
//!
//! ### `SUMMER_ERROR_DETAIL`
//!
//! Whether server-error pages include the failure's cause chain. Accepts
//! `true`/`false`/`1`/`0`.
//!
//! Default: `true`
//!
//! ## Usage
//!
//! ```rust
//! use summer::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Slow match threshold: {:?}", config.slow_match_threshold);
//! ```
//!
//! Unparseable values fall back to the defaults.

use std::env;
use std::time::Duration;

const DEFAULT_SLOW_MATCH_US: u64 = 1_000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Route matches slower than this are logged as slow
    pub slow_match_threshold: Duration,
    /// Include cause chains in rendered server errors
    pub error_detail: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            slow_match_threshold: Duration::from_micros(DEFAULT_SLOW_MATCH_US),
            error_detail: true,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let slow_match_threshold = lookup("SUMMER_SLOW_MATCH_US")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_micros)
            .unwrap_or(defaults.slow_match_threshold);

        let error_detail = lookup("SUMMER_ERROR_DETAIL")
            .and_then(|v| match v.trim().to_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            })
            .unwrap_or(defaults.error_detail);

        RuntimeConfig {
            slow_match_threshold,
            error_detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> RuntimeConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RuntimeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        assert_eq!(load(&[]), RuntimeConfig::default());
    }

    #[test]
    fn overrides() {
        let config = load(&[("SUMMER_SLOW_MATCH_US", "250"), ("SUMMER_ERROR_DETAIL", "FALSE")]);
        assert_eq!(config.slow_match_threshold, Duration::from_micros(250));
        assert!(!config.error_detail);
    }

    #[test]
    fn garbage_falls_back() {
        let config = load(&[("SUMMER_SLOW_MATCH_US", "fast"), ("SUMMER_ERROR_DETAIL", "maybe")]);
        assert_eq!(config, RuntimeConfig::default());
    }
}
