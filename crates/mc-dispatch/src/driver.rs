//! # Dispatch Driver
//!
//! Two loops cooperate through a [`DispatchSignal`]:
//!
//! ```text
//! tokio task                      dedicated thread "{center}-dispatch"
//! ┌──────────────────┐  request   ┌──────────────────────────────────┐
//! │ interval tick    │ ─────────→ │ poll every poll_interval         │
//! │ (never blocks)   │   (flag)   │ take flag → dispatch() → updates │
//! └──────────────────┘            └──────────────────────────────────┘
//! ```
//!
//! The trigger only flips a flag, so a slow cycle never backs up the timer
//! and requests that arrive during a cycle collapse into one.

use crate::config::DriverConfig;
use crate::error::{DriverError, DriverResult};
use crate::failure::FailurePolicy;
use crate::metrics;
use crate::signal::{DispatchSignal, DriverState};
use crate::update::{Updatable, UpdateListeners};
use message_center::{DeliveryError, DeliveryResult, MessageCenter, QueueName};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

/// Something the driver can run cycles on.
pub trait Dispatch: Send + Sync + 'static {
    /// Name used in thread names and log lines.
    fn center_name(&self) -> &str;

    /// Run one cycle. `Ok(true)` when at least one message was acknowledged.
    fn dispatch_cycle(&self) -> DeliveryResult<bool>;
}

impl<N, P> Dispatch for MessageCenter<N, P>
where
    N: QueueName,
    P: Send + Sync + 'static,
{
    fn center_name(&self) -> &str {
        self.name()
    }

    fn dispatch_cycle(&self) -> DeliveryResult<bool> {
        self.dispatch()
    }
}

/// State shared by the trigger, the worker and the handle.
struct Shared {
    center: Arc<dyn Dispatch>,
    signal: DispatchSignal,
    listeners: UpdateListeners,
    policy: FailurePolicy,
    stopping: AtomicBool,
    cycles: AtomicU64,
}

impl Shared {
    fn name(&self) -> &str {
        self.center.center_name()
    }

    /// Dispatch, then fan out if anything was acknowledged.
    fn cycle(&self) -> DeliveryResult<bool> {
        let acknowledged = self.center.dispatch_cycle()?;
        if acknowledged && !self.listeners.is_empty() {
            let notified = self.listeners.notify_all()?;
            metrics::record_update_fanout();
            trace!(center = %self.name(), notified, "Update listeners notified");
        }
        Ok(acknowledged)
    }

    /// Run one guarded cycle, already claimed through
    /// [`DispatchSignal::take_and_begin`]. Returns false once the worker
    /// must stop.
    fn run_cycle(&self) -> bool {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.cycle()));
        self.signal.end_cycle();
        self.cycles.fetch_add(1, Ordering::SeqCst);

        let err = match outcome {
            Ok(Ok(acknowledged)) => {
                metrics::record_cycle(acknowledged);
                return true;
            }
            Ok(Err(err)) => err,
            Err(payload) => DeliveryError::recoverable(format!(
                "callback panicked: {}",
                panic_message(payload.as_ref())
            )),
        };

        metrics::record_cycle(false);
        let fatal = err.is_fatal();
        if !fatal {
            metrics::record_recoverable_error();
        }
        self.policy.report(&err);
        !fatal
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}

fn run_worker(shared: Arc<Shared>, poll_interval: Duration) {
    debug!(center = %shared.name(), "Dispatch worker started");
    while !shared.stopping.load(Ordering::Acquire) {
        if shared.signal.take_and_begin() && !shared.run_cycle() {
            warn!(center = %shared.name(), "Dispatch worker stopped after fatal error");
            return;
        }
        thread::sleep(poll_interval);
    }
    debug!(center = %shared.name(), "Dispatch worker stopped");
}

async fn run_trigger(
    shared: Arc<Shared>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // First tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => shared.signal.request(),
            _ = shutdown_rx.changed() => break,
        }
    }
    debug!(center = %shared.name(), "Dispatch trigger stopped");
}

/// Entry point for building a driver.
pub struct DispatchDriver;

impl DispatchDriver {
    /// Start configuring a driver for `center`.
    pub fn builder<D: Dispatch>(center: Arc<D>) -> DispatchDriverBuilder {
        DispatchDriverBuilder {
            center,
            config: DriverConfig::default(),
            listeners: Vec::new(),
            policy: FailurePolicy::default(),
        }
    }
}

/// Driver builder.
pub struct DispatchDriverBuilder {
    center: Arc<dyn Dispatch>,
    config: DriverConfig,
    listeners: Vec<Arc<dyn Updatable>>,
    policy: FailurePolicy,
}

impl DispatchDriverBuilder {
    #[must_use]
    pub fn config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    /// Register an update listener before the driver starts.
    #[must_use]
    pub fn update_listener(mut self, listener: Arc<dyn Updatable>) -> Self {
        self.listeners.push(listener);
        self
    }

    #[must_use]
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Start the trigger task and the worker thread.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> DriverResult<DriverHandle> {
        self.config.validate()?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| DriverError::NoRuntime)?;

        let listeners = UpdateListeners::new();
        for listener in self.listeners {
            listeners.add(listener);
        }

        let shared = Arc::new(Shared {
            center: self.center,
            signal: DispatchSignal::new(),
            listeners,
            policy: self.policy,
            stopping: AtomicBool::new(false),
            cycles: AtomicU64::new(0),
        });

        let worker = {
            let shared = Arc::clone(&shared);
            let poll_interval = self.config.poll_interval();
            thread::Builder::new()
                .name(format!("{}-dispatch", shared.name()))
                .spawn(move || run_worker(shared, poll_interval))
                .map_err(DriverError::WorkerSpawn)?
        };

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let trigger = runtime.spawn(run_trigger(
            Arc::clone(&shared),
            self.config.dispatch_interval(),
            shutdown_rx,
        ));

        info!(
            center = %shared.name(),
            dispatch_interval_ms = self.config.dispatch_interval_ms,
            poll_interval_ms = self.config.poll_interval_ms,
            "Dispatch driver started"
        );

        Ok(DriverHandle {
            shared,
            shutdown_tx,
            trigger: Some(trigger),
            worker: Some(worker),
        })
    }
}

/// Running driver. Dropping it stops both loops.
pub struct DriverHandle {
    shared: Arc<Shared>,
    shutdown_tx: watch::Sender<bool>,
    trigger: Option<JoinHandle<()>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl DriverHandle {
    /// Ask for a cycle now, on top of the timer.
    pub fn request_dispatch(&self) {
        self.shared.signal.request();
    }

    #[must_use]
    pub fn state(&self) -> DriverState {
        self.shared.signal.state()
    }

    /// Cycles run so far, failed ones included.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.shared.cycles.load(Ordering::SeqCst)
    }

    /// Whether the worker thread is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    pub fn add_update_listener(&self, listener: Arc<dyn Updatable>) -> bool {
        self.shared.listeners.add(listener)
    }

    pub fn remove_update_listener(&self, listener: &Arc<dyn Updatable>) -> bool {
        self.shared.listeners.remove(listener)
    }

    /// Stop both loops and wait for the worker to finish its current cycle.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if self.trigger.is_none() && self.worker.is_none() {
            return;
        }
        self.shared.stopping.store(true, Ordering::Release);
        let _ = self.shutdown_tx.send(true);

        if let Some(trigger) = self.trigger.take() {
            trigger.abort();
        }

        if let Some(worker) = self.worker.take() {
            // A listener dropping the handle runs on the worker itself
            if worker.thread().id() == thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                warn!(center = %self.shared.name(), "Dispatch worker panicked");
            }
        }
        info!(center = %self.shared.name(), cycles = self.cycles(), "Dispatch driver stopped");
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for DriverHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverHandle")
            .field("center", &self.shared.name())
            .field("state", &self.state())
            .field("cycles", &self.cycles())
            .finish()
    }
}
