//! # Driver Flows
//!
//! The bus driven by a real [`DispatchDriver`](mc_dispatch::DispatchDriver):
//! timed cycles, update fan-out and failure handling.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{eventually, payloads, recording, Log};
    use mc_dispatch::{DispatchDriver, DriverConfig, DriverState, FailurePolicy, Updatable};
    use message_center::{DeliveryError, DeliveryResult, Message, MessageCenter, ReceiverHandle};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    type Center = MessageCenter<String, u32>;

    fn manual() -> DriverConfig {
        DriverConfig::default()
            .with_dispatch_interval_ms(60_000)
            .with_poll_interval_ms(5)
    }

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> Arc<dyn Updatable> {
        let log = Arc::clone(log);
        Arc::new(move || -> DeliveryResult<()> {
            log.lock().push(tag);
            Ok(())
        })
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_listeners_run_once_in_order_after_cycle() {
        let center = Arc::new(Center::new("views"));
        let delivered = Log::default();
        center.add_receiver(&recording("r", &delivered), "Data".to_string());

        let updates = Arc::new(Mutex::new(Vec::new()));
        let driver = DispatchDriver::builder(Arc::clone(&center))
            .config(manual())
            .update_listener(recorder(&updates, "L1"))
            .update_listener(recorder(&updates, "L2"))
            .spawn()
            .unwrap();

        center.submit(Message::new("Data".to_string(), 1));
        center.submit(Message::new("Data".to_string(), 2));
        driver.request_dispatch();

        assert!(eventually(|| updates.lock().len() == 2).await);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(*updates.lock(), vec!["L1", "L2"]);
        assert_eq!(payloads(&delivered), vec![1, 2]);
        assert_eq!(driver.cycles(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_recoverable_error_reported_then_next_cycle_delivers() {
        let center = Arc::new(Center::new("recover"));
        let failures = Arc::new(AtomicUsize::new(1));
        let delivered = Log::default();

        let remaining = Arc::clone(&failures);
        let sink = Arc::clone(&delivered);
        let receiver = ReceiverHandle::from_fn(move |msg: &Message<String, u32>| -> DeliveryResult<bool> {
            if remaining.load(Ordering::SeqCst) > 0 {
                remaining.fetch_sub(1, Ordering::SeqCst);
                return Err(DeliveryError::recoverable("disk busy"));
            }
            if let Some(&v) = msg.payload() {
                sink.lock().push(("r".to_string(), v));
            }
            Ok(true)
        });
        center.add_receiver(&receiver, "Q".to_string());

        let reported = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reported);
        let policy = FailurePolicy::default()
            .with_on_recoverable(move |err| sink.lock().push(err.to_string()));

        let driver = DispatchDriver::builder(Arc::clone(&center))
            .config(manual())
            .failure_policy(policy)
            .spawn()
            .unwrap();

        center.submit(Message::new("Q".to_string(), 1));
        center.submit(Message::new("Q".to_string(), 2));
        driver.request_dispatch();
        assert!(eventually(|| reported.lock().len() == 1).await);
        assert!(reported.lock()[0].contains("disk busy"));

        // The failed cycle dropped its batch
        assert_eq!(center.stats().dropped, 1);

        center.submit(Message::new("Q".to_string(), 3));
        driver.request_dispatch();
        assert!(eventually(|| payloads(&delivered) == vec![3]).await);
        assert!(driver.is_running());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failing_listener_stops_fan_out_but_not_driver() {
        let center = Arc::new(Center::new("listener-failure"));
        center.add_receiver(&recording("r", &Log::default()), "Q".to_string());

        let updates = Arc::new(Mutex::new(Vec::new()));
        let failing: Arc<dyn Updatable> =
            Arc::new(|| -> DeliveryResult<()> { Err(DeliveryError::recoverable("view closed")) });

        let reported = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reported);
        let driver = DispatchDriver::builder(Arc::clone(&center))
            .config(manual())
            .update_listener(failing)
            .update_listener(recorder(&updates, "L2"))
            .failure_policy(FailurePolicy::default().with_on_recoverable(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .spawn()
            .unwrap();

        center.submit(Message::new("Q".to_string(), 1));
        driver.request_dispatch();

        assert!(eventually(|| reported.load(Ordering::SeqCst) == 1).await);
        assert!(updates.lock().is_empty());
        assert!(driver.is_running());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_timer_picks_up_steady_stream() {
        let center = Arc::new(Center::new("stream"));
        let delivered = Log::default();
        center.add_receiver(&recording("r", &delivered), "Q".to_string());

        let driver = DispatchDriver::builder(Arc::clone(&center))
            .config(DriverConfig::new(10, 2).unwrap())
            .spawn()
            .unwrap();

        for value in 0..20 {
            center.submit(Message::new("Q".to_string(), value));
            tokio::time::sleep(Duration::from_millis(3)).await;
        }

        assert!(eventually(|| delivered.lock().len() == 20).await);
        assert_eq!(payloads(&delivered), (0..20).collect::<Vec<_>>());
        assert!(driver.cycles() > 1);
        assert!(eventually(|| driver.state() != DriverState::Dispatching).await);
    }
}
