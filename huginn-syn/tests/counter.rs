use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use huginn_syn::SequenceCounter;

#[test]
fn concurrent_increments_yield_distinct_values() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 1000;

    let counter = Arc::new(SequenceCounter::new());
    let seen: Vec<Vec<u64>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let counter = Arc::clone(&counter);
                s.spawn(move || (0..PER_THREAD).map(|_| counter.next()).collect::<Vec<_>>())
            })
            .collect();
        handles.into_iter().filter_map(|h| h.join().ok()).collect()
    });

    let all: HashSet<u64> = seen.into_iter().flatten().collect();
    let total = (THREADS * PER_THREAD) as u64;
    assert_eq!(all.len() as u64, total);
    assert!(all.iter().all(|v| *v < total));
    assert_eq!(counter.current(), total);
}
