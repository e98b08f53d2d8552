//! # Message Center Benchmarks
//!
//! | Benchmark | What it measures |
//! |-----------|------------------|
//! | `submit` | stamping and queueing one message |
//! | `submit_and_dispatch` | a full cycle over N messages spread across queues |
//! | `collapse` | replace-heavy traffic on one queue |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use message_center::{DeliveryResult, Message, MessageCenter, ReceiverHandle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type Center = MessageCenter<&'static str, u64>;

const QUEUES: [&str; 4] = ["Data", "Sel", "Pos", "Status"];

fn counting_center() -> (Center, Arc<AtomicU64>) {
    let center = Center::new("bench");
    let sum = Arc::new(AtomicU64::new(0));
    let acc = Arc::clone(&sum);
    let receiver = ReceiverHandle::from_fn(move |msg: &Message<&'static str, u64>| -> DeliveryResult<bool> {
        if let Some(v) = msg.payload() {
            acc.fetch_add(*v, Ordering::Relaxed);
        }
        Ok(true)
    });
    for queue in QUEUES {
        center.add_receiver(&receiver, queue);
    }
    (center, sum)
}

fn bench_submit(c: &mut Criterion) {
    let mut group = c.benchmark_group("message-center");
    let (center, _sum) = counting_center();

    group.bench_function("submit", |b| {
        let mut i = 0_u64;
        b.iter(|| {
            i += 1;
            black_box(center.submit(Message::new(QUEUES[(i % 4) as usize], i)));
            if i % 10_000 == 0 {
                // Keep the queues from growing without bound
                let _ = center.dispatch();
            }
        })
    });
    group.finish();
}

fn bench_submit_and_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("message-center");
    for size in [10_u64, 100, 1_000, 10_000] {
        let (center, sum) = counting_center();
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(
            BenchmarkId::new("submit_and_dispatch", size),
            &size,
            |b, &size| {
                b.iter(|| {
                    for i in 0..size {
                        center.submit(Message::new(QUEUES[(i % 4) as usize], i));
                    }
                    black_box(center.dispatch().ok());
                })
            },
        );
        black_box(sum.load(Ordering::Relaxed));
    }
    group.finish();
}

fn bench_collapse(c: &mut Criterion) {
    let mut group = c.benchmark_group("message-center");
    let (center, _sum) = counting_center();

    group.throughput(Throughput::Elements(1_000));
    group.bench_function("collapse", |b| {
        b.iter(|| {
            for i in 0..1_000_u64 {
                center.submit(Message::replacing("Pos", i));
            }
            black_box(center.dispatch().ok());
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_submit,
    bench_submit_and_dispatch,
    bench_collapse
);
criterion_main!(benches);
