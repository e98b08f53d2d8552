//! # Failure Policy
//!
//! How the worker reports errors that escape a dispatch cycle.
//!
//! - Recoverable errors (and panics, which are treated as recoverable) are
//!   logged and shown on stderr; the next scheduled cycle runs normally.
//! - Fatal errors are reported, then the process exits with
//!   [`FATAL_EXIT_CODE`].
//!
//! Both hooks can be replaced, which is how tests observe failures without
//! the process going away.

use message_center::DeliveryError;
use std::fmt;
use std::sync::Arc;
use tracing::error;

/// Exit status used by the default fatal hook.
pub const FATAL_EXIT_CODE: i32 = 70;

/// Failure callback.
pub type FailureHook = Arc<dyn Fn(&DeliveryError) + Send + Sync>;

/// Pair of hooks the worker calls on failure.
#[derive(Clone)]
pub struct FailurePolicy {
    on_recoverable: FailureHook,
    on_fatal: FailureHook,
}

impl FailurePolicy {
    /// Custom hooks.
    pub fn new(on_recoverable: FailureHook, on_fatal: FailureHook) -> Self {
        Self {
            on_recoverable,
            on_fatal,
        }
    }

    /// Replace the recoverable hook.
    #[must_use]
    pub fn with_on_recoverable<F>(mut self, hook: F) -> Self
    where
        F: Fn(&DeliveryError) + Send + Sync + 'static,
    {
        self.on_recoverable = Arc::new(hook);
        self
    }

    /// Replace the fatal hook.
    #[must_use]
    pub fn with_on_fatal<F>(mut self, hook: F) -> Self
    where
        F: Fn(&DeliveryError) + Send + Sync + 'static,
    {
        self.on_fatal = Arc::new(hook);
        self
    }

    /// Route an error to the matching hook.
    pub fn report(&self, err: &DeliveryError) {
        if err.is_fatal() {
            (self.on_fatal)(err);
        } else {
            (self.on_recoverable)(err);
        }
    }
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self {
            on_recoverable: Arc::new(report_recoverable),
            on_fatal: Arc::new(exit_on_fatal),
        }
    }
}

impl fmt::Debug for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailurePolicy").finish_non_exhaustive()
    }
}

fn report_recoverable(err: &DeliveryError) {
    error!(error = %err, "Dispatch cycle failed, continuing");
    eprintln!("message dispatch failed: {err}");
}

fn exit_on_fatal(err: &DeliveryError) {
    error!(error = %err, exit_code = FATAL_EXIT_CODE, "Fatal dispatch error, terminating");
    eprintln!("fatal message dispatch error: {err}");
    std::process::exit(FATAL_EXIT_CODE);
}
