//! Telemetry configuration from environment variables.

use std::env;

/// Logging configuration for a message center process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line
    pub service_name: String,

    /// Log filter directive (trace, debug, info, warn, error, or a full
    /// `EnvFilter` directive such as `message_center=debug,info`)
    pub log_level: String,

    /// Whether to write logs to stdout at all
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Log every delivery made by the bus
    pub debug_send: bool,

    /// Log every submission accepted by the bus
    pub debug_receive: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "message-center".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            debug_send: false,
            debug_receive: false,
        }
    }
}

fn flag(var: &str, default: bool) -> bool {
    env::var(var)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(default)
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MC_SERVICE_NAME`: Service name (default: message-center)
    /// - `MC_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `MC_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `MC_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `MC_DEBUG_SEND`: Log every delivery (default: false)
    /// - `MC_DEBUG_RECEIVE`: Log every submission (default: false)
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("MC_SERVICE_NAME")
                .unwrap_or_else(|_| "message-center".to_string()),

            log_level: env::var("MC_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("MC_CONSOLE_OUTPUT")
                .map(|v| !v.eq_ignore_ascii_case("false") && v != "0")
                .unwrap_or(true),

            json_logs: flag("MC_JSON_LOGS", false),
            debug_send: flag("MC_DEBUG_SEND", false),
            debug_receive: flag("MC_DEBUG_RECEIVE", false),
        }
    }

    /// Configuration for a named service, otherwise from the environment.
    pub fn for_service(service_name: &str) -> Self {
        let mut config = Self::from_env();
        config.service_name = service_name.to_string();
        config
    }
}
