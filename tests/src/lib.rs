//! # Message Center Test Suite
//!
//! Unified test crate for behaviour that spans the bus and the driver.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── dispatch_benchmarks.rs   # submit + dispatch throughput
//! └── src/integration/
//!     ├── ordering.rs              # cross-queue ordering, tie-breaks
//!     ├── queues.rs                # collapsing, orphan queues, registration
//!     ├── driver_flows.rs          # timer/worker cycles, updates, failures
//!     └── concurrency.rs           # many producers, reentrant receivers
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mc-tests
//! cargo test -p mc-tests integration::driver_flows
//! cargo bench -p mc-tests
//! ```

pub mod integration;
