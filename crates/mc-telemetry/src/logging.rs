//! `tracing-subscriber` installation.
//!
//! Human-readable output by default, JSON when `json_logs` is set. Thread
//! names are always printed: deliveries happen on `{center}-dispatch` and
//! `{center}-detached` threads, and that is usually the first thing to check.

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// Fails with [`TelemetryError::AlreadyInitialized`] if a global subscriber
/// is already set.
pub fn try_init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::InvalidFilter(e.to_string()))?;

    let result = if !config.console_output {
        tracing_subscriber::registry().with(env_filter).try_init()
    } else if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    };
    result.map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}

/// Install the global subscriber, treating an existing one as success.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    match try_init_logging(config) {
        Err(TelemetryError::AlreadyInitialized(reason)) => {
            tracing::debug!(%reason, "Logging already initialized");
            Ok(())
        }
        other => other,
    }
}
