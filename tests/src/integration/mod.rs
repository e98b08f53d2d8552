//! Cross-crate integration scenarios.

pub mod concurrency;
pub mod driver_flows;

#[cfg(test)]
pub(crate) mod fixtures {
    use message_center::{DeliveryResult, Message, ReceiverHandle};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    pub type Log = Arc<Mutex<Vec<(String, u32)>>>;

    /// Receiver that records `(label, payload)` and acknowledges.
    pub fn recording(label: &'static str, log: &Log) -> ReceiverHandle<String, u32> {
        let log = Arc::clone(log);
        ReceiverHandle::from_fn(move |msg: &Message<String, u32>| -> DeliveryResult<bool> {
            if let Some(&value) = msg.payload() {
                log.lock().push((label.to_string(), value));
            }
            Ok(true)
        })
    }

    pub fn payloads(log: &Log) -> Vec<u32> {
        log.lock().iter().map(|(_, v)| *v).collect()
    }

    /// Poll `condition` for up to two seconds.
    pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        condition()
    }
}
