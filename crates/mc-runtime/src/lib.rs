//! # Message Center Runtime
//!
//! Wires a [`MessageCenter`] to a [`DispatchDriver`] and two receivers that
//! log what they get. The binary walks it through two rounds:
//!
//! 1. Nine messages to "Queue 1" and "Queue 2", both listened to.
//! 2. The "Queue 2" receiver is removed, nine more messages are sent, and a
//!    replacing message collapses everything still pending for "Queue 1".

use std::sync::Arc;

use anyhow::{Context, Result};
use mc_dispatch::{DispatchDriver, DriverConfig, DriverHandle};
use mc_telemetry::TelemetryConfig;
use message_center::{DeliveryResult, Message, MessageCenter, Receiver, ReceiverHandle};
use parking_lot::Mutex;
use tracing::info;

/// Queue served by the first receiver.
pub const QUEUE_1: &str = "Queue 1";

/// Queue served by the second receiver until it is removed.
pub const QUEUE_2: &str = "Queue 2";

/// Dispatch interval used when the environment does not set one.
pub const DEMO_DISPATCH_INTERVAL_MS: u64 = 1500;

pub type DemoCenter = MessageCenter<String, u32>;

/// One delivery seen by a demo receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub receiver: String,
    pub queue: String,
    pub value: u32,
}

/// Receiver that logs and records every message.
pub struct DemoReceiver {
    label: String,
    log: Arc<Mutex<Vec<Delivery>>>,
}

impl DemoReceiver {
    pub fn new(label: impl Into<String>, log: Arc<Mutex<Vec<Delivery>>>) -> Self {
        Self {
            label: label.into(),
            log,
        }
    }
}

impl Receiver<String, u32> for DemoReceiver {
    fn receive(&self, message: &Message<String, u32>) -> DeliveryResult<bool> {
        let Some(&value) = message.payload() else {
            return Ok(false);
        };
        info!(
            receiver = %self.label,
            queue = %message.name(),
            value,
            timestamp = %message.timestamp(),
            "Received message"
        );
        self.log.lock().push(Delivery {
            receiver: self.label.clone(),
            queue: message.name().clone(),
            value,
        });
        Ok(true)
    }
}

/// Driver configuration for the demo: the demo interval, then the
/// environment on top.
pub fn load_driver_config() -> Result<DriverConfig> {
    DriverConfig::default()
        .with_dispatch_interval_ms(DEMO_DISPATCH_INTERVAL_MS)
        .overridden_from_env()
        .context("Invalid dispatch driver configuration")
}

/// Running demo.
pub struct DemoRuntime {
    center: Arc<DemoCenter>,
    driver: DriverHandle,
    receiver_1: ReceiverHandle<String, u32>,
    receiver_2: ReceiverHandle<String, u32>,
    log: Arc<Mutex<Vec<Delivery>>>,
}

impl DemoRuntime {
    /// Create the center, register both receivers and start the driver.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: DriverConfig, telemetry: &TelemetryConfig) -> Result<Self> {
        let center = Arc::new(DemoCenter::new("TestCenter"));
        center.set_debug_send(telemetry.debug_send);
        center.set_debug_receive(telemetry.debug_receive);

        let log = Arc::new(Mutex::new(Vec::new()));
        let receiver_1 = ReceiverHandle::new(DemoReceiver::new("receiver_1", Arc::clone(&log)));
        let receiver_2 = ReceiverHandle::new(DemoReceiver::new("receiver_2", Arc::clone(&log)));
        center.add_receiver(&receiver_1, QUEUE_1.to_string());
        center.add_receiver(&receiver_2, QUEUE_2.to_string());

        let driver = DispatchDriver::builder(Arc::clone(&center))
            .config(config)
            .spawn()
            .context("Failed to start dispatch driver")?;

        Ok(Self {
            center,
            driver,
            receiver_1,
            receiver_2,
            log,
        })
    }

    fn send(&self, queue: &str, value: u32, replace: bool) {
        let message = Message::new(queue.to_string(), value).with_replace(replace);
        self.center.submit(message);
    }

    /// Nine messages to two listened queues.
    pub fn send_first_round(&self) {
        for value in 1..=4 {
            self.send(QUEUE_1, value, false);
        }
        for value in 5..=7 {
            self.send(QUEUE_2, value, false);
        }
        for value in 8..=9 {
            self.send(QUEUE_1, value, false);
        }
        info!("Sent 9 messages to 2 queues");
    }

    /// Drop the "Queue 2" receiver, then send nine more messages; the
    /// replacing message 18 collapses 11..=14.
    pub fn send_second_round(&self) {
        self.center
            .remove_receiver(&self.receiver_2, QUEUE_2.to_string());

        for value in 11..=14 {
            self.send(QUEUE_1, value, false);
        }
        for value in 15..=17 {
            self.send(QUEUE_2, value, false);
        }
        self.send(QUEUE_1, 18, true);
        self.send(QUEUE_1, 19, false);
        info!(
            "Sent 9 messages to 2 queues, removed the {} receiver and collapsed all but the last two {} messages",
            QUEUE_2, QUEUE_1
        );
    }

    /// Request a cycle without waiting for the timer.
    pub fn request_dispatch(&self) {
        self.driver.request_dispatch();
    }

    pub fn center(&self) -> &Arc<DemoCenter> {
        &self.center
    }

    pub fn receiver_1(&self) -> &ReceiverHandle<String, u32> {
        &self.receiver_1
    }

    /// Everything delivered so far, in delivery order.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.log.lock().clone()
    }

    /// Stop the driver.
    pub fn shutdown(self) {
        let stats = self.center.stats();
        info!(
            submitted = stats.submitted,
            delivered = stats.delivered,
            dropped = stats.dropped,
            collapsed = stats.collapsed,
            "Shutting down"
        );
        self.driver.shutdown();
    }
}
