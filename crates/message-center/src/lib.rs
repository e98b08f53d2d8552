//! # Message Center - Named-Queue Bus with Batched Delivery
//!
//! Decouples producers of state-change events (data loaded, selection
//! changed, computation finished) from the components that react to them.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐   submit()    ┌─────────────────────────┐
//! │  Producer A  │ ────────────→ │  MessageCenter          │
//! └──────────────┘               │                         │
//! ┌──────────────┐   submit()    │  "Pos"  → [m4]          │
//! │  Producer B  │ ────────────→ │  "Data" → [m1, m3]      │
//! └──────────────┘               │  "Sel"  → [m2]          │
//!                                └────────────┬────────────┘
//!                                             │ dispatch(): drain all,
//!                                             │ sort by (timestamp, tag)
//!                                             ↓
//!                        receivers of each name, then the completion queue
//! ```
//!
//! ## Guarantees
//!
//! - **Ordered:** one cycle delivers its whole batch in (timestamp, sequence
//!   tag) order, across all queues.
//! - **At-most-once:** a cycle drains every queue, listened to or not. Nothing
//!   is redelivered.
//! - **Collapsing:** a `replace` message discards whatever is still pending
//!   for its name.
//!
//! Cycles are normally driven by the `mc-dispatch` crate; submitting
//! [`Submission::ProcessMessages`] runs one inline.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod center;
pub mod clock;
pub mod error;
pub mod message;
pub mod ordering;
pub mod receiver;

pub use center::{CenterStats, CompletionPolicy, MessageCenter};
pub use clock::{Clock, ManualClock, MonotonicClock, Timestamp};
pub use error::{DeliveryError, DeliveryResult, UsageError};
pub use message::{Message, QueueName, Submission};
pub use ordering::OrderKey;
pub use receiver::{Receiver, ReceiverHandle};

/// Reserved queue name for cycle completion notices (string-named centers).
pub const COMPLETION_QUEUE: &str = "MC_Queue:SequenceOfMessagesProcessed";
