//! # Ordering Rule
//!
//! Messages drained in one cycle are delivered in a single total order:
//! timestamp ascending, then sequence tag ascending. Tags are assigned inside
//! the same critical section that appends to the queue, so two messages
//! stamped with the same timestamp still come out in submission order.

use crate::clock::Timestamp;
use crate::message::Message;
use std::cmp::Ordering;
use std::sync::Arc;

/// Sort key of a message. Field order matters: the derived `Ord` compares
/// `timestamp` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderKey {
    pub timestamp: Timestamp,
    pub sequence_tag: u64,
}

/// Compare two messages under the ordering rule.
pub fn compare<N, P>(a: &Message<N, P>, b: &Message<N, P>) -> Ordering {
    a.order_key().cmp(&b.order_key())
}

/// Sort a drained batch in delivery order.
pub fn sort_batch<N, P>(batch: &mut [Arc<Message<N, P>>]) {
    batch.sort_by_key(|m| m.order_key());
}
