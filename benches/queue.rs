//! Benchmarks for the string queue.
//!
//! Insert/remove throughput, reversal and sorting, each against the closest
//! std collection.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::collections::VecDeque;
use std::hint::black_box;
use strqueue::stdx::Queue;

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

/// Deterministic pseudo-random keys so sort input is not presorted.
fn keys(count: usize) -> Vec<String> {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    (0..count)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            format!("{:016x}", state)
        })
        .collect()
}

fn queue_of(values: &[String]) -> Queue {
    let mut queue = Queue::new();
    for v in values {
        queue.insert_tail(v).unwrap();
    }
    queue
}

fn bench_insert_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_remove");

    for &n in &SIZES {
        let values = keys(n);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("queue", n), &values, |b, values| {
            b.iter(|| {
                let mut queue = Queue::new();
                for v in values {
                    queue.insert_tail(v).unwrap();
                }
                let mut buf = [0u8; 32];
                while queue.remove_head(Some(&mut buf)).is_ok() {
                    black_box(&buf);
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("vec_deque", n), &values, |b, values| {
            b.iter(|| {
                let mut deque: VecDeque<String> = VecDeque::new();
                for v in values {
                    deque.push_back(v.clone());
                }
                while let Some(v) = deque.pop_front() {
                    black_box(v);
                }
            });
        });
    }

    group.finish();
}

fn bench_reverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("reverse");

    for &n in &SIZES {
        let mut queue = queue_of(&keys(n));
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(BenchmarkId::new("queue", n), |b| {
            b.iter(|| {
                queue.reverse();
                black_box(queue.peek_head());
            });
        });
    }

    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort");
    group.sample_size(20);

    for &n in &SIZES {
        let values = keys(n);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("queue", n), &values, |b, values| {
            b.iter_batched(
                || queue_of(values),
                |mut queue| {
                    queue.sort();
                    queue
                },
                criterion::BatchSize::LargeInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("slice_sort", n), &values, |b, values| {
            b.iter_batched(
                || values.clone(),
                |mut values| {
                    values.sort();
                    values
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert_remove, bench_reverse, bench_sort);
criterion_main!(benches);
