//! Single-slot dispatch request shared by the trigger and the worker.

use std::sync::atomic::{AtomicBool, Ordering};

/// Observable phase of the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverState {
    /// Nothing requested, no cycle running
    Idle,
    /// A cycle was requested and the worker has not picked it up yet
    Requested,
    /// The worker is inside dispatch or the update fan-out
    Dispatching,
}

/// Request flag plus in-flight marker.
///
/// Requests coalesce: setting the flag twice before the worker looks is one
/// request.
#[derive(Debug, Default)]
pub struct DispatchSignal {
    requested: AtomicBool,
    dispatching: AtomicBool,
}

impl DispatchSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a cycle. Never blocks.
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Clear the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.requested.swap(false, Ordering::AcqRel)
    }

    /// Claim a pending request and mark the cycle as started.
    ///
    /// `dispatching` is set before the request is cleared, so `state()`
    /// moves from `Requested` straight to `Dispatching`.
    pub(crate) fn take_and_begin(&self) -> bool {
        if !self.requested.load(Ordering::Acquire) {
            return false;
        }
        self.dispatching.store(true, Ordering::Release);
        self.requested.store(false, Ordering::Release);
        true
    }

    pub(crate) fn end_cycle(&self) {
        self.dispatching.store(false, Ordering::Release);
    }

    /// Current phase.
    #[must_use]
    pub fn state(&self) -> DriverState {
        // Read the request first: seeing it cleared implies seeing the cycle
        let requested = self.requested.load(Ordering::Acquire);
        if self.dispatching.load(Ordering::Acquire) {
            DriverState::Dispatching
        } else if requested {
            DriverState::Requested
        } else {
            DriverState::Idle
        }
    }
}
