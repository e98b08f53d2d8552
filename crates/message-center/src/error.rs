//! # Message Center Errors
//!
//! Two separate taxonomies live here:
//!
//! - [`UsageError`] describes a harmless misuse of the bus (a duplicate
//!   registration). It never leaves the bus: the call logs it and carries on.
//! - [`DeliveryError`] is what a receiver or update listener reports from
//!   inside a dispatch cycle. The dispatch driver decides what happens next
//!   based on the variant.

use thiserror::Error;

/// A misuse of the bus API.
///
/// Logged at `warn`; the call is otherwise a no-op.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// The receiver is already registered under this name.
    #[error("receiver already registered for {queue} in {center}")]
    DuplicateReceiver { center: String, queue: String },
}

/// Failure reported by a receiver or update listener during a cycle.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The callback failed but the process state is still trustworthy.
    /// The driver reports it and keeps running.
    #[error("recoverable delivery error: {reason}")]
    Recoverable {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The callback detected corrupted process state. The driver reports it
    /// and terminates the process.
    #[error("fatal delivery error: {reason}")]
    Fatal { reason: String },
}

impl DeliveryError {
    /// Recoverable error with a plain reason.
    pub fn recoverable(reason: impl Into<String>) -> Self {
        Self::Recoverable {
            reason: reason.into(),
            source: None,
        }
    }

    /// Recoverable error wrapping an underlying cause.
    pub fn recoverable_from<E>(reason: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Recoverable {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Fatal error.
    pub fn fatal(reason: impl Into<String>) -> Self {
        Self::Fatal {
            reason: reason.into(),
        }
    }

    /// Whether the process must stop after reporting this error.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }
}

/// Result of a single receiver or listener callback.
pub type DeliveryResult<T> = Result<T, DeliveryError>;
