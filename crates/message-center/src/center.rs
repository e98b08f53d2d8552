//! # Message Center
//!
//! The bus itself: named queues of pending messages plus the receivers
//! registered for each name.
//!
//! ## Locking
//!
//! Both tables sit behind one mutex. `submit`, `add_receiver`,
//! `remove_receiver` and the drain step of `dispatch` each take it exactly
//! once, so no caller ever sees a half-updated table. Delivery runs after the
//! lock is released, against a snapshot of the receiver table, which lets a
//! receiver submit follow-up messages from inside `receive`.
//!
//! A second lock, the dispatch gate, keeps a single cycle in flight per
//! center. A `dispatch` that finds the gate taken returns `Ok(false)` at once.

use crate::clock::{Clock, MonotonicClock};
use crate::error::{DeliveryResult, UsageError};
use crate::message::{next_sequence_tag, Message, QueueName, Submission};
use crate::ordering::sort_batch;
use crate::receiver::ReceiverHandle;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// When the completion notice goes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionPolicy {
    /// Only after a cycle in which at least one message was acknowledged.
    #[default]
    AfterAcknowledged,
    /// After every cycle, even an empty one.
    Heartbeat,
}

/// Snapshot of a center's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CenterStats {
    /// Messages accepted by `submit`.
    pub submitted: u64,
    /// Pending messages discarded by a `replace` submission.
    pub collapsed: u64,
    /// Dispatch cycles run.
    pub cycles: u64,
    /// Messages handed to at least one receiver.
    pub delivered: u64,
    /// Messages at least one receiver acknowledged.
    pub acknowledged: u64,
    /// Messages drained with nobody listening, or cut off by a failed cycle.
    pub dropped: u64,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    collapsed: AtomicU64,
    cycles: AtomicU64,
    delivered: AtomicU64,
    acknowledged: AtomicU64,
    dropped: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }
}

type QueueTable<N, P> = HashMap<N, Vec<Arc<Message<N, P>>>>;
type ReceiverTable<N, P> = HashMap<N, Vec<ReceiverHandle<N, P>>>;

struct Tables<N, P> {
    queues: QueueTable<N, P>,
    receivers: ReceiverTable<N, P>,
}

/// Named-queue publish/subscribe bus with batched, ordered delivery.
pub struct MessageCenter<N, P> {
    /// Name used in every log line.
    name: String,

    /// Source of submission timestamps.
    clock: Arc<dyn Clock>,

    /// Pending queues and receiver lists.
    tables: Mutex<Tables<N, P>>,

    /// Held for the whole of a dispatch cycle.
    dispatch_gate: Mutex<()>,

    completion_policy: CompletionPolicy,

    debug_send: AtomicBool,
    debug_receive: AtomicBool,

    counters: Counters,
}

impl<N, P> MessageCenter<N, P>
where
    N: QueueName,
    P: Send + Sync + 'static,
{
    /// Create an empty center stamped by a monotonic clock.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_clock(name, Arc::new(MonotonicClock::new()))
    }

    /// Create an empty center with a custom clock.
    #[must_use]
    pub fn with_clock(name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: name.into(),
            clock,
            tables: Mutex::new(Tables {
                queues: HashMap::new(),
                receivers: HashMap::new(),
            }),
            dispatch_gate: Mutex::new(()),
            completion_policy: CompletionPolicy::default(),
            debug_send: AtomicBool::new(false),
            debug_receive: AtomicBool::new(false),
            counters: Counters::default(),
        }
    }

    /// Choose when the completion notice is sent.
    #[must_use]
    pub fn with_completion_policy(mut self, policy: CompletionPolicy) -> Self {
        self.completion_policy = policy;
        self
    }

    /// Name of this center.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue that receives the completion notice after a cycle.
    ///
    /// Subscribe here to react once per batch instead of once per message.
    #[must_use]
    pub fn completion_queue_name(&self) -> N {
        N::messages_processed()
    }

    /// Log every delivery made by this center.
    pub fn set_debug_send(&self, on: bool) {
        self.debug_send.store(on, Ordering::Relaxed);
    }

    /// Log every message submitted to this center.
    pub fn set_debug_receive(&self, on: bool) {
        self.debug_receive.store(on, Ordering::Relaxed);
    }

    /// Accept a message, or run a cycle for [`Submission::ProcessMessages`].
    ///
    /// # Returns
    ///
    /// - for a message: `true` once it is queued
    /// - for `ProcessMessages`: `true` iff the cycle acknowledged a message
    pub fn submit(&self, submission: impl Into<Submission<N, P>>) -> bool {
        match submission.into() {
            Submission::ProcessMessages => match self.dispatch() {
                Ok(acknowledged) => acknowledged,
                Err(err) => {
                    error!(center = %self.name, error = %err, "Dispatch cycle failed");
                    false
                }
            },
            Submission::Post(message) => self.post(message),
        }
    }

    fn post(&self, mut message: Message<N, P>) -> bool {
        if self.debug_receive.load(Ordering::Relaxed) {
            info!(
                center = %self.name,
                queue = ?message.name(),
                replace = message.replace(),
                detached = message.is_detached(),
                "Message received"
            );
        }

        let collapsed = {
            let mut tables = self.tables.lock();
            message.stamp(self.clock.now(), next_sequence_tag());

            let queue = tables.queues.entry(message.name().clone()).or_default();
            let collapsed = if message.replace() {
                let pending = queue.len();
                queue.clear();
                pending
            } else {
                0
            };
            queue.push(Arc::new(message));
            collapsed
        };

        if collapsed > 0 {
            trace!(center = %self.name, collapsed, "Pending messages replaced");
            Counters::bump(&self.counters.collapsed, collapsed as u64);
        }
        Counters::bump(&self.counters.submitted, 1);
        true
    }

    /// Register `receiver` for messages sent to `name`.
    ///
    /// Registering the same receiver twice under one name is logged and
    /// otherwise ignored.
    pub fn add_receiver(&self, receiver: &ReceiverHandle<N, P>, name: N) -> bool {
        let mut tables = self.tables.lock();
        let list = tables.receivers.entry(name.clone()).or_default();
        if list.iter().any(|r| r.same_receiver(receiver)) {
            drop(tables);
            let err = UsageError::DuplicateReceiver {
                center: self.name.clone(),
                queue: format!("{name:?}"),
            };
            warn!(error = %err, "Ignoring duplicate registration");
        } else {
            list.push(receiver.clone());
            debug!(center = %self.name, queue = ?name, receiver = receiver.address(), "Receiver added");
        }
        true
    }

    /// Unregister `receiver` from `name`.
    ///
    /// Removing a receiver that was never registered succeeds. Returns
    /// `true`.
    pub fn remove_receiver(&self, receiver: &ReceiverHandle<N, P>, name: N) -> bool {
        let mut tables = self.tables.lock();
        let Some(list) = tables.receivers.get_mut(&name) else {
            return true;
        };

        let before = list.len();
        list.retain(|r| !r.same_receiver(receiver));
        let removed = before != list.len();
        if list.is_empty() {
            tables.receivers.remove(&name);
        }
        drop(tables);

        if removed {
            debug!(center = %self.name, queue = ?name, receiver = receiver.address(), "Receiver removed");
        } else {
            debug!(center = %self.name, queue = ?name, "Receiver was not registered");
        }
        true
    }

    /// Run one dispatch cycle: drain every queue, sort, deliver.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` - at least one message (or the completion notice) was
    ///   acknowledged by a receiver
    /// - `Ok(false)` - nothing was acknowledged, or another cycle is running
    /// - `Err(_)` - a receiver failed; the rest of the batch is dropped
    pub fn dispatch(&self) -> DeliveryResult<bool> {
        let Some(_gate) = self.dispatch_gate.try_lock() else {
            debug!(center = %self.name, "Dispatch already in progress");
            return Ok(false);
        };

        let (mut batch, receivers) = {
            let mut tables = self.tables.lock();
            let batch: Vec<Arc<Message<N, P>>> =
                tables.queues.drain().flat_map(|(_, queue)| queue).collect();
            (batch, tables.receivers.clone())
        };
        Counters::bump(&self.counters.cycles, 1);

        sort_batch(&mut batch);

        let total = batch.len();
        let mut acknowledged = 0_usize;
        for (index, message) in batch.iter().enumerate() {
            match self.deliver(message, &receivers) {
                Ok(true) => acknowledged += 1,
                Ok(false) => {}
                Err(err) => {
                    let dropped = total - index - 1;
                    Counters::bump(&self.counters.dropped, dropped as u64);
                    warn!(
                        center = %self.name,
                        queue = ?message.name(),
                        dropped,
                        error = %err,
                        "Dispatch cycle aborted by receiver"
                    );
                    return Err(err);
                }
            }
        }

        let send_notice = match self.completion_policy {
            CompletionPolicy::AfterAcknowledged => acknowledged > 0,
            CompletionPolicy::Heartbeat => true,
        };
        let notice_acknowledged = if send_notice {
            let notice = Arc::new(Message::messages_processed(self.clock.now()));
            self.deliver(&notice, &receivers)?
        } else {
            false
        };

        debug!(
            center = %self.name,
            messages = total,
            acknowledged,
            notice_acknowledged,
            "Dispatch cycle complete"
        );
        Ok(acknowledged > 0 || notice_acknowledged)
    }

    /// Hand one message to every receiver registered for its name.
    fn deliver(
        &self,
        message: &Arc<Message<N, P>>,
        receivers: &ReceiverTable<N, P>,
    ) -> DeliveryResult<bool> {
        let counted = !message.is_messages_processed();
        let Some(listeners) = receivers.get(message.name()).filter(|l| !l.is_empty()) else {
            if counted {
                trace!(center = %self.name, queue = ?message.name(), "No receivers, message dropped");
                Counters::bump(&self.counters.dropped, 1);
            }
            return Ok(false);
        };

        let debug_send = self.debug_send.load(Ordering::Relaxed);
        let mut changed = false;
        for receiver in listeners {
            if debug_send {
                info!(
                    center = %self.name,
                    queue = ?message.name(),
                    sequence_tag = message.sequence_tag(),
                    receiver = receiver.address(),
                    "Sending message"
                );
            }

            if message.is_detached() {
                self.deliver_detached(Arc::clone(message), receiver.clone());
            } else if receiver.receive(message)? {
                changed = true;
            }
        }

        if counted {
            Counters::bump(&self.counters.delivered, 1);
            if changed {
                Counters::bump(&self.counters.acknowledged, 1);
            }
        }
        Ok(changed)
    }

    /// Deliver on a thread of its own. The outcome is logged, never counted.
    fn deliver_detached(&self, message: Arc<Message<N, P>>, receiver: ReceiverHandle<N, P>) {
        let center = self.name.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("{}-detached", self.name))
            .spawn(move || {
                if let Err(err) = receiver.receive(&message) {
                    warn!(
                        center = %center,
                        queue = ?message.name(),
                        error = %err,
                        "Detached delivery failed"
                    );
                }
            });

        if let Err(err) = spawned {
            error!(center = %self.name, error = %err, "Could not start detached delivery");
        }
    }

    /// Number of messages waiting for the next cycle.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.tables.lock().queues.values().map(Vec::len).sum()
    }

    /// Number of receivers registered for `name`.
    #[must_use]
    pub fn receiver_count(&self, name: &N) -> usize {
        self.tables.lock().receivers.get(name).map_or(0, Vec::len)
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> CenterStats {
        let c = &self.counters;
        CenterStats {
            submitted: c.submitted.load(Ordering::Relaxed),
            collapsed: c.collapsed.load(Ordering::Relaxed),
            cycles: c.cycles.load(Ordering::Relaxed),
            delivered: c.delivered.load(Ordering::Relaxed),
            acknowledged: c.acknowledged.load(Ordering::Relaxed),
            dropped: c.dropped.load(Ordering::Relaxed),
        }
    }
}

impl<N, P> fmt::Debug for MessageCenter<N, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageCenter")
            .field("name", &self.name)
            .field("completion_policy", &self.completion_policy)
            .finish_non_exhaustive()
    }
}
