//! # Update Fan-out
//!
//! After a cycle that acknowledged at least one message the worker calls
//! every registered [`Updatable`] once, in registration order. Typical
//! listeners are views that redraw from state the receivers just changed.

use message_center::DeliveryResult;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Post-cycle listener.
pub trait Updatable: Send + Sync {
    /// Called at most once per cycle.
    fn update(&self) -> DeliveryResult<()>;
}

impl<F> Updatable for F
where
    F: Fn() -> DeliveryResult<()> + Send + Sync,
{
    fn update(&self) -> DeliveryResult<()> {
        self()
    }
}

/// Ordered listener list. Identity is the identity of the shared object.
#[derive(Default)]
pub struct UpdateListeners {
    listeners: RwLock<Vec<Arc<dyn Updatable>>>,
}

fn same_listener(a: &Arc<dyn Updatable>, b: &Arc<dyn Updatable>) -> bool {
    Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
}

impl UpdateListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener. Returns false if it is already registered.
    pub fn add(&self, listener: Arc<dyn Updatable>) -> bool {
        let mut listeners = self.listeners.write();
        if listeners.iter().any(|l| same_listener(l, &listener)) {
            warn!("Update listener already registered");
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn remove(&self, listener: &Arc<dyn Updatable>) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| !same_listener(l, listener));
        before != listeners.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Call every listener in order. The first failure stops the fan-out.
    ///
    /// The list is snapshotted first so a listener may register or remove
    /// listeners without deadlocking; the change applies from the next call.
    pub fn notify_all(&self) -> DeliveryResult<usize> {
        let snapshot: Vec<Arc<dyn Updatable>> = self.listeners.read().clone();
        for (index, listener) in snapshot.iter().enumerate() {
            if let Err(err) = listener.update() {
                debug!(index, skipped = snapshot.len() - index - 1, "Update fan-out stopped");
                return Err(err);
            }
        }
        Ok(snapshot.len())
    }
}

impl std::fmt::Debug for UpdateListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateListeners")
            .field("len", &self.len())
            .finish()
    }
}
