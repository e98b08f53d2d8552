//! # Dispatch Metrics
//!
//! Prometheus counters for the dispatch worker.
//!
//! Enable with the `metrics` feature:
//! ```toml
//! mc-dispatch = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `mc_dispatch_cycles_total` - Dispatch cycles run by workers
//! - `mc_dispatch_acknowledged_cycles_total` - Cycles that acknowledged at least one message
//! - `mc_dispatch_recoverable_errors_total` - Cycles that ended in a recoverable error or panic
//! - `mc_dispatch_update_fanouts_total` - Completed update fan-outs

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, IntCounter};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total dispatch cycles
    pub static ref CYCLES: IntCounter = register_int_counter!(
        "mc_dispatch_cycles_total",
        "Total number of dispatch cycles run"
    )
    .expect("Failed to create CYCLES metric");

    /// Cycles with at least one acknowledgement
    pub static ref ACKNOWLEDGED_CYCLES: IntCounter = register_int_counter!(
        "mc_dispatch_acknowledged_cycles_total",
        "Total number of dispatch cycles that acknowledged a message"
    )
    .expect("Failed to create ACKNOWLEDGED_CYCLES metric");

    /// Recoverable failures
    pub static ref RECOVERABLE_ERRORS: IntCounter = register_int_counter!(
        "mc_dispatch_recoverable_errors_total",
        "Total number of dispatch cycles that failed recoverably"
    )
    .expect("Failed to create RECOVERABLE_ERRORS metric");

    /// Completed update fan-outs
    pub static ref UPDATE_FANOUTS: IntCounter = register_int_counter!(
        "mc_dispatch_update_fanouts_total",
        "Total number of completed update fan-outs"
    )
    .expect("Failed to create UPDATE_FANOUTS metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a finished cycle
#[cfg(feature = "metrics")]
pub fn record_cycle(acknowledged: bool) {
    CYCLES.inc();
    if acknowledged {
        ACKNOWLEDGED_CYCLES.inc();
    }
}

/// Record a recoverable failure
#[cfg(feature = "metrics")]
pub fn record_recoverable_error() {
    RECOVERABLE_ERRORS.inc();
}

/// Record a completed fan-out
#[cfg(feature = "metrics")]
pub fn record_update_fanout() {
    UPDATE_FANOUTS.inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_cycle(_acknowledged: bool) {}

#[cfg(not(feature = "metrics"))]
pub fn record_recoverable_error() {}

#[cfg(not(feature = "metrics"))]
pub fn record_update_fanout() {}
