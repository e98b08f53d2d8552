//! # Message Center Telemetry
//!
//! Logging setup shared by every binary that runs a message center.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mc_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MC_SERVICE_NAME` | `message-center` | Service name in the startup line |
//! | `MC_LOG_LEVEL` | `info` | Log filter (falls back to `RUST_LOG`) |
//! | `MC_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `MC_JSON_LOGS` | `false` | JSON formatted logs |
//! | `MC_DEBUG_SEND` | `false` | Log each delivery |
//! | `MC_DEBUG_RECEIVE` | `false` | Log each submission |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, try_init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}
