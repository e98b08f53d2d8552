//! # Concurrency
//!
//! Many producers against one bus, and receivers that call back into it.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{eventually, recording, Log};
    use mc_dispatch::{DispatchDriver, DriverConfig};
    use message_center::{DeliveryResult, Message, MessageCenter, ReceiverHandle};
    use parking_lot::Mutex;
    use rand::Rng;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::thread;

    type Center = MessageCenter<String, u32>;

    #[test]
    fn test_parallel_producers_keep_per_producer_order() {
        const PRODUCERS: u32 = 8;
        const PER_PRODUCER: u32 = 200;

        let center = Arc::new(Center::new("parallel"));
        let log = Log::default();
        for p in 0..PRODUCERS {
            center.add_receiver(&recording("r", &log), format!("P{p}"));
        }

        let handles: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let center = Arc::clone(&center);
                thread::spawn(move || {
                    let mut rng = rand::thread_rng();
                    for i in 0..PER_PRODUCER {
                        assert!(center.submit(Message::new(format!("P{p}"), p * 1000 + i)));
                        if rng.gen_bool(0.05) {
                            thread::yield_now();
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        center.dispatch().unwrap();

        let delivered = log.lock().clone();
        assert_eq!(delivered.len(), (PRODUCERS * PER_PRODUCER) as usize);

        let mut last: HashMap<u32, u32> = HashMap::new();
        for (_, value) in delivered {
            let producer = value / 1000;
            if let Some(prev) = last.insert(producer, value) {
                assert!(prev < value, "producer {producer}: {prev} before {value}");
            }
        }
        assert_eq!(center.stats().submitted, u64::from(PRODUCERS * PER_PRODUCER));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reentrant_submit_lands_in_next_cycle() {
        let center = Arc::new(Center::new("reentrant"));
        let log = Log::default();
        center.add_receiver(&recording("echo", &log), "Echo".to_string());

        let weak = Arc::downgrade(&center);
        let forwarder = ReceiverHandle::from_fn(move |msg: &Message<String, u32>| -> DeliveryResult<bool> {
            if let (Some(center), Some(&v)) = (weak.upgrade(), msg.payload()) {
                center.submit(Message::new("Echo".to_string(), v + 100));
            }
            Ok(true)
        });
        center.add_receiver(&forwarder, "In".to_string());

        let driver = DispatchDriver::builder(Arc::clone(&center))
            .config(DriverConfig::new(10, 2).unwrap())
            .spawn()
            .unwrap();

        center.submit(Message::new("In".to_string(), 1));
        assert!(eventually(|| log.lock().len() == 1).await);
        assert_eq!(log.lock()[0], ("echo".to_string(), 101));
        assert!(driver.cycles() >= 2);
    }

    #[test]
    fn test_registration_during_cycle_applies_next_cycle() {
        let center = Arc::new(Center::new("late-registration"));
        let log = Log::default();
        let late = recording("late", &log);

        let weak = Arc::downgrade(&center);
        let added = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&added);
        let late_clone = late.clone();
        let registrar = ReceiverHandle::from_fn(move |_: &Message<String, u32>| -> DeliveryResult<bool> {
            if let Some(center) = weak.upgrade() {
                center.add_receiver(&late_clone, "Q".to_string());
                *flag.lock() = true;
            }
            Ok(true)
        });
        center.add_receiver(&registrar, "Q".to_string());

        center.submit(Message::new("Q".to_string(), 1));
        center.submit(Message::new("Q".to_string(), 2));
        center.dispatch().unwrap();
        assert!(*added.lock());
        assert!(log.lock().is_empty());

        center.submit(Message::new("Q".to_string(), 3));
        center.dispatch().unwrap();
        assert_eq!(log.lock().clone(), vec![("late".to_string(), 3)]);
    }
}
