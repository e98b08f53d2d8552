//! # Messages
//!
//! Defines the values that flow through the message center.
//!
//! A [`Message`] is addressed to a named queue and carries an arbitrary
//! payload. The bus stamps it with a timestamp and a process-wide sequence
//! tag at submission; after that it is immutable.

use crate::clock::Timestamp;
use crate::ordering::OrderKey;
use crate::COMPLETION_QUEUE;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide tag counter, shared by every center in the process.
static NEXT_SEQUENCE_TAG: AtomicU64 = AtomicU64::new(0);

/// Take the next sequence tag. Never repeats within a process.
pub(crate) fn next_sequence_tag() -> u64 {
    NEXT_SEQUENCE_TAG.fetch_add(1, Ordering::Relaxed)
}

/// Key type used to name queues.
///
/// The application picks the key type. It has to provide the name used for
/// cycle completion notices. Every value is a usable queue name, the empty
/// string included.
pub trait QueueName: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// The queue that receives [`Message::messages_processed`].
    fn messages_processed() -> Self;
}

impl QueueName for String {
    fn messages_processed() -> Self {
        COMPLETION_QUEUE.to_string()
    }
}

impl QueueName for &'static str {
    fn messages_processed() -> Self {
        COMPLETION_QUEUE
    }
}

/// A message addressed to one named queue.
#[derive(Clone)]
pub struct Message<N, P> {
    name: N,
    payload: Option<P>,
    replace: bool,
    detached: bool,
    timestamp: Timestamp,
    sequence_tag: u64,
}

impl<N: QueueName, P> Message<N, P> {
    /// Ordinary message. Pending messages for the same name are kept.
    pub fn new(name: N, payload: P) -> Self {
        Self {
            name,
            payload: Some(payload),
            replace: false,
            detached: false,
            timestamp: Timestamp::default(),
            sequence_tag: 0,
        }
    }

    /// Message that discards everything still pending for its name
    /// ("latest value wins").
    pub fn replacing(name: N, payload: P) -> Self {
        Self::new(name, payload).with_replace(true)
    }

    /// Set the replace flag.
    #[must_use]
    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    /// Deliver this message to each receiver on its own thread.
    ///
    /// Detached deliveries never count as acknowledgements.
    #[must_use]
    pub fn detached(mut self) -> Self {
        self.detached = true;
        self
    }

    /// The notice delivered to the completion queue after a cycle.
    pub(crate) fn messages_processed(timestamp: Timestamp) -> Self {
        Self {
            name: N::messages_processed(),
            payload: None,
            replace: true,
            detached: false,
            timestamp,
            sequence_tag: next_sequence_tag(),
        }
    }

    /// Whether this is the cycle completion notice.
    #[must_use]
    pub fn is_messages_processed(&self) -> bool {
        self.payload.is_none() && self.name == N::messages_processed()
    }
}

impl<N, P> Message<N, P> {
    /// Record the submission clock reading and sequence tag.
    pub(crate) fn stamp(&mut self, timestamp: Timestamp, sequence_tag: u64) {
        self.timestamp = timestamp;
        self.sequence_tag = sequence_tag;
    }

    /// Queue name.
    pub fn name(&self) -> &N {
        &self.name
    }

    /// Payload. `None` only for the completion notice.
    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    /// Whether this message collapses the pending queue.
    #[must_use]
    pub fn replace(&self) -> bool {
        self.replace
    }

    /// Whether receivers get this message on their own thread.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Clock reading taken at submission.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Submission order tag.
    #[must_use]
    pub fn sequence_tag(&self) -> u64 {
        self.sequence_tag
    }

    /// Key used by the ordering rule.
    #[must_use]
    pub fn order_key(&self) -> OrderKey {
        OrderKey {
            timestamp: self.timestamp,
            sequence_tag: self.sequence_tag,
        }
    }
}

impl<N: fmt::Debug, P> fmt::Debug for Message<N, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("name", &self.name)
            .field("has_payload", &self.payload.is_some())
            .field("replace", &self.replace)
            .field("detached", &self.detached)
            .field("timestamp", &self.timestamp)
            .field("sequence_tag", &self.sequence_tag)
            .finish()
    }
}

/// What a producer hands to [`MessageCenter::submit`](crate::MessageCenter::submit).
#[derive(Debug, Clone)]
pub enum Submission<N, P> {
    /// Queue an ordinary message.
    Post(Message<N, P>),
    /// Run a dispatch cycle now (the `PROCESS_MESSAGES` sentinel).
    ProcessMessages,
}

impl<N, P> From<Message<N, P>> for Submission<N, P> {
    fn from(message: Message<N, P>) -> Self {
        Self::Post(message)
    }
}
