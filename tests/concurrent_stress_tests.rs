//! Stress Tests for the Concurrent FIFO Cache
//!
//! These tests verify thread safety and correctness under high contention.

use fifo_cache::{ConcurrentFifoCache, FifoCacheConfig, ManualClock};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

const NUM_THREADS: usize = 16;
const OPS_PER_THREAD: usize = 10_000;

fn make_cache(max_size: usize) -> Arc<ConcurrentFifoCache<usize, usize>> {
    Arc::new(ConcurrentFifoCache::init(
        FifoCacheConfig::new("stress", max_size),
        None,
    ))
}

/// Stress test with all threads writing distinct keys into a small cache
#[test]
fn stress_high_contention_writes() {
    let cache = make_cache(100);

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                cache.put(t * OPS_PER_THREAD + i, i).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(cache.assert_consistent().is_ok());
    // Soft bound: at most one concurrent writer per thread could have skipped its trim.
    assert!(cache.size() <= 100 + NUM_THREADS);
    cache.put(usize::MAX, 0).unwrap();
    assert!(cache.size() <= 100);
}

/// Stress test mixing every operation on a small key space
#[test]
fn stress_mixed_operations() {
    let cache = make_cache(256);
    let ops = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        let ops = Arc::clone(&ops);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                let key = (t * 31 + i * 17) % 1024;
                match i % 10 {
                    0..=3 => cache.put(key, i).unwrap(),
                    4..=7 => {
                        let _ = cache.get(&key).unwrap();
                    }
                    8 => {
                        let _ = cache.remove(&key).unwrap();
                    }
                    _ => {
                        let _ = cache.cached_objects();
                    }
                }
                ops.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(ops.load(Ordering::Relaxed), NUM_THREADS * OPS_PER_THREAD);
    assert!(cache.assert_consistent().is_ok());
}

/// Readers hammer a fixed working set while writers churn other keys
#[test]
fn stress_readers_and_writers() {
    let cache = make_cache(10_000);
    for key in 0..1_000 {
        cache.put(key, key).unwrap();
    }
    let stop = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..NUM_THREADS / 2)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut reads = 0usize;
                while !stop.load(Ordering::Relaxed) {
                    for key in 0..1_000 {
                        assert_eq!(cache.get(&key).unwrap(), Some(key));
                        reads += 1;
                    }
                }
                reads
            })
        })
        .collect();

    let writers: Vec<_> = (0..NUM_THREADS / 2)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD / 10 {
                    let key = 1_000 + (t * OPS_PER_THREAD + i) % 4_000;
                    cache.put(key, i).unwrap();
                }
            })
        })
        .collect();

    for handle in writers {
        handle.join().expect("Thread panicked");
    }
    stop.store(true, Ordering::Relaxed);
    let reads: usize = readers
        .into_iter()
        .map(|handle| handle.join().expect("Thread panicked"))
        .sum();

    assert!(reads >= 1_000);
    assert!(cache.assert_consistent().is_ok());
}

/// Expiration racing with reads, writes and removals
#[test]
fn stress_expiration() {
    let clock = Arc::new(ManualClock::new(0));
    let cache: Arc<ConcurrentFifoCache<usize, usize>> = Arc::new(
        ConcurrentFifoCache::init(
            FifoCacheConfig::new("expiring", 512).with_live_time_millis(5),
            None,
        )
        .with_clock(clock.clone()),
    );

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        let clock = Arc::clone(&clock);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD / 4 {
                let key = (t + i) % 128;
                if t == 0 && i % 16 == 0 {
                    clock.advance(1);
                }
                match i % 3 {
                    0 => cache.put(key, i).unwrap(),
                    1 => {
                        let _ = cache.get(&key).unwrap();
                    }
                    _ => {
                        let _ = cache.remove(&key).unwrap();
                    }
                }
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(cache.assert_consistent().is_ok());
    clock.advance(10);
    assert!(cache.cached_objects().is_empty());
}

/// Edge case: empty cache reads
#[test]
fn stress_empty_cache() {
    let cache = make_cache(100);

    let mut handles = Vec::new();
    for _ in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..1000 {
                assert!(cache.get(&i).unwrap().is_none());
                assert!(cache.remove(&i).unwrap().is_none());
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(cache.is_empty());
    assert_eq!(cache.misses(), (NUM_THREADS * 1000) as u64);
}

/// Edge case: single item cache
#[test]
fn stress_single_item_cache() {
    let cache = make_cache(1);

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..1000 {
                cache.put(t, i).unwrap();
                let _ = cache.get(&t);
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(cache.assert_consistent().is_ok());
    cache.put(usize::MAX, 0).unwrap();
    assert_eq!(cache.size(), 1);
}
