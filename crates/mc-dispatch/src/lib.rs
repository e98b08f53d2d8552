//! # Dispatch Driver for the Message Center
//!
//! Runs [`MessageCenter::dispatch`](message_center::MessageCenter::dispatch)
//! at a steady cadence on a dedicated worker thread, and notifies update
//! listeners after every cycle that changed something.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let center = Arc::new(MessageCenter::<String, Event>::new("app"));
//! let driver = DispatchDriver::builder(Arc::clone(&center))
//!     .config(DriverConfig::from_env()?)
//!     .update_listener(view)
//!     .spawn()?;
//! ```
//!
//! ## Failure Handling
//!
//! | Outcome of a cycle | Action |
//! |--------------------|--------|
//! | `Ok(_)` | next cycle on the next request |
//! | `Recoverable` or panic | reported via [`FailurePolicy`], loop continues |
//! | `Fatal` | reported, process exits with [`FATAL_EXIT_CODE`] |

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod driver;
pub mod error;
pub mod failure;
pub mod metrics;
pub mod signal;
pub mod update;

pub use config::DriverConfig;
pub use driver::{Dispatch, DispatchDriver, DispatchDriverBuilder, DriverHandle};
pub use error::{ConfigError, DriverError, DriverResult};
pub use failure::{FailureHook, FailurePolicy, FATAL_EXIT_CODE};
pub use signal::{DispatchSignal, DriverState};
pub use update::{Updatable, UpdateListeners};
