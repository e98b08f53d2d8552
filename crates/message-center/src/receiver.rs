//! # Receivers
//!
//! Defines the consuming side of the message center.
//!
//! A receiver is registered under one or more queue names and is called once
//! per delivered message, on the dispatch worker thread. Identity is the
//! identity of the shared receiver object: registering the same
//! [`ReceiverHandle`] (or a clone of it) twice under one name is a no-op.

use crate::error::DeliveryResult;
use crate::message::Message;
use std::fmt;
use std::sync::Arc;

/// Consumer of messages.
pub trait Receiver<N, P>: Send + Sync {
    /// Handle one message.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` - the call changed this receiver's state
    /// - `Ok(false)` - nothing changed
    /// - `Err(_)` - the delivery failed; the driver decides whether to go on
    fn receive(&self, message: &Message<N, P>) -> DeliveryResult<bool>;
}

impl<N, P, F> Receiver<N, P> for F
where
    F: Fn(&Message<N, P>) -> DeliveryResult<bool> + Send + Sync,
{
    fn receive(&self, message: &Message<N, P>) -> DeliveryResult<bool> {
        self(message)
    }
}

/// Shared, identity-comparable reference to a receiver.
pub struct ReceiverHandle<N, P> {
    inner: Arc<dyn Receiver<N, P>>,
}

impl<N: 'static, P: 'static> ReceiverHandle<N, P> {
    /// Wrap a receiver in a fresh handle.
    pub fn new<R>(receiver: R) -> Self
    where
        R: Receiver<N, P> + 'static,
    {
        Self {
            inner: Arc::new(receiver),
        }
    }

    /// Wrap a closure.
    pub fn from_fn<F>(receive: F) -> Self
    where
        F: Fn(&Message<N, P>) -> DeliveryResult<bool> + Send + Sync + 'static,
    {
        Self::new(receive)
    }

    /// Use an already shared receiver. Handles built from clones of the same
    /// `Arc` are the same receiver.
    pub fn from_arc(receiver: Arc<dyn Receiver<N, P>>) -> Self {
        Self { inner: receiver }
    }
}

impl<N, P> ReceiverHandle<N, P> {
    /// Whether both handles point at the same receiver object.
    #[must_use]
    pub fn same_receiver(&self, other: &Self) -> bool {
        self.address() == other.address()
    }

    /// Address of the receiver object, used for identity and in log lines.
    #[must_use]
    pub fn address(&self) -> usize {
        Arc::as_ptr(&self.inner).cast::<()>() as usize
    }

    /// Deliver a message to the wrapped receiver.
    pub fn receive(&self, message: &Message<N, P>) -> DeliveryResult<bool> {
        self.inner.receive(message)
    }
}

impl<N, P> Clone for ReceiverHandle<N, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<N, P> PartialEq for ReceiverHandle<N, P> {
    fn eq(&self, other: &Self) -> bool {
        self.same_receiver(other)
    }
}

impl<N, P> Eq for ReceiverHandle<N, P> {}

impl<N, P> fmt::Debug for ReceiverHandle<N, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReceiverHandle({:#x})", self.address())
    }
}

impl<N: 'static, P: 'static, R> From<Arc<R>> for ReceiverHandle<N, P>
where
    R: Receiver<N, P> + 'static,
{
    fn from(receiver: Arc<R>) -> Self {
        Self { inner: receiver }
    }
}
