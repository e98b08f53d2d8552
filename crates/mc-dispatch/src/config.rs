//! # Driver Configuration
//!
//! Two knobs control the cadence of dispatch cycles:
//!
//! | Field | Default | Env | Meaning |
//! |-------|---------|-----|---------|
//! | `dispatch_interval_ms` | 100 | `MC_DISPATCH_INTERVAL_MS` | how often the timer requests a cycle |
//! | `poll_interval_ms` | 30 | `MC_POLL_INTERVAL_MS` | how often the worker looks for a request |
//!
//! The poll interval bounds the latency between a request and the cycle
//! actually starting.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Environment variable overriding `dispatch_interval_ms`.
pub const ENV_DISPATCH_INTERVAL: &str = "MC_DISPATCH_INTERVAL_MS";

/// Environment variable overriding `poll_interval_ms`.
pub const ENV_POLL_INTERVAL: &str = "MC_POLL_INTERVAL_MS";

/// Dispatch driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Cadence of the timer that requests a cycle
    #[serde(default = "default_dispatch_interval_ms")]
    pub dispatch_interval_ms: u64,

    /// Worker poll period
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_dispatch_interval_ms() -> u64 {
    100
}

fn default_poll_interval_ms() -> u64 {
    30
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            dispatch_interval_ms: default_dispatch_interval_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl DriverConfig {
    /// Create a validated configuration
    pub fn new(dispatch_interval_ms: u64, poll_interval_ms: u64) -> Result<Self, ConfigError> {
        let config = Self {
            dispatch_interval_ms,
            poll_interval_ms,
        };
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `MC_DISPATCH_INTERVAL_MS` / `MC_POLL_INTERVAL_MS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().overridden_from_env()
    }

    /// `self` overridden by whichever of the two variables are set
    pub fn overridden_from_env(self) -> Result<Self, ConfigError> {
        let config = Self {
            dispatch_interval_ms: read_millis(ENV_DISPATCH_INTERVAL, self.dispatch_interval_ms)?,
            poll_interval_ms: read_millis(ENV_POLL_INTERVAL, self.poll_interval_ms)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject zero intervals
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "dispatch_interval_ms",
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "poll_interval_ms",
            });
        }
        Ok(())
    }

    /// Builder-style method to set the dispatch interval
    #[must_use]
    pub fn with_dispatch_interval_ms(mut self, millis: u64) -> Self {
        self.dispatch_interval_ms = millis;
        self
    }

    /// Builder-style method to set the poll interval
    #[must_use]
    pub fn with_poll_interval_ms(mut self, millis: u64) -> Self {
        self.poll_interval_ms = millis;
        self
    }

    /// Dispatch interval as a Duration
    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_millis(self.dispatch_interval_ms)
    }

    /// Poll interval as a Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn read_millis(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnvValue { var, value }),
        Err(_) => Ok(default),
    }
}
