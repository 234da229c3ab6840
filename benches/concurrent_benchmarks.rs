//! Concurrent Cache Benchmarks
//!
//! Benchmarks for measuring concurrent cache performance across different
//! access patterns and thread counts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fifo_cache::{ConcurrentFifoCache, FifoCacheConfig};
use std::sync::Arc;
use std::thread;

const CACHE_SIZE: usize = 10_000;
const OPS_PER_THREAD: usize = 1_000;

fn make_cache(max_size: usize) -> Arc<ConcurrentFifoCache<usize, usize>> {
    Arc::new(ConcurrentFifoCache::init(
        FifoCacheConfig::new("bench", max_size),
        None,
    ))
}

fn populated_cache() -> Arc<ConcurrentFifoCache<usize, usize>> {
    let cache = make_cache(CACHE_SIZE);
    for i in 0..CACHE_SIZE {
        cache.put(i, i).unwrap();
    }
    cache
}

/// Benchmark concurrent read operations
fn concurrent_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Reads");
    group.throughput(Throughput::Elements((8 * OPS_PER_THREAD) as u64));

    let cache = populated_cache();
    group.bench_function("FIFO", |b| {
        b.iter(|| run_concurrent_reads(Arc::clone(&cache), 8, OPS_PER_THREAD));
    });

    group.finish();
}

/// Benchmark concurrent write operations
fn concurrent_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Writes");
    group.throughput(Throughput::Elements((8 * OPS_PER_THREAD) as u64));

    group.bench_function("FIFO", |b| {
        let cache = make_cache(CACHE_SIZE);
        b.iter(|| run_concurrent_writes(Arc::clone(&cache), 8, OPS_PER_THREAD));
    });

    group.bench_function("FIFO evicting", |b| {
        let cache = make_cache(CACHE_SIZE / 10);
        b.iter(|| run_concurrent_writes(Arc::clone(&cache), 8, OPS_PER_THREAD));
    });

    group.finish();
}

/// Benchmark mixed read/write operations (80% reads, 20% writes)
fn concurrent_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Mixed (80/20)");
    group.throughput(Throughput::Elements((8 * OPS_PER_THREAD) as u64));

    group.bench_function("FIFO", |b| {
        let cache = populated_cache();
        b.iter(|| run_concurrent_mixed(Arc::clone(&cache), 8, OPS_PER_THREAD));
    });

    group.finish();
}

/// Benchmark scaling with the number of threads
fn thread_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Thread Scaling");

    for threads in [1, 2, 4, 8, 16] {
        group.throughput(Throughput::Elements((threads * OPS_PER_THREAD) as u64));
        group.bench_with_input(BenchmarkId::new("FIFO mixed", threads), &threads, |b, &threads| {
            let cache = populated_cache();
            b.iter(|| run_concurrent_mixed(Arc::clone(&cache), threads, OPS_PER_THREAD));
        });
    }

    group.finish();
}

fn run_concurrent_reads(
    cache: Arc<ConcurrentFifoCache<usize, usize>>,
    num_threads: usize,
    ops_per_thread: usize,
) {
    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let key = (t * ops_per_thread + i) % CACHE_SIZE;
                    black_box(cache.get(&key).unwrap());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

fn run_concurrent_writes(
    cache: Arc<ConcurrentFifoCache<usize, usize>>,
    num_threads: usize,
    ops_per_thread: usize,
) {
    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let key = t * ops_per_thread + i;
                    cache.put(key, i).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

fn run_concurrent_mixed(
    cache: Arc<ConcurrentFifoCache<usize, usize>>,
    num_threads: usize,
    ops_per_thread: usize,
) {
    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let key = (t * ops_per_thread + i) % CACHE_SIZE;
                    if i % 5 == 0 {
                        cache.put(key, i).unwrap();
                    } else {
                        black_box(cache.get(&key).unwrap());
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

criterion_group!(
    benches,
    concurrent_reads,
    concurrent_writes,
    concurrent_mixed,
    thread_scaling
);
criterion_main!(benches);
