use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use huginn_syn_common::{extract_features, parse_frame, FilterConfig, FlowKey, PassReason, SynRecord};
use serde::Serialize;
use tracing::trace;

use crate::cache::{FingerprintCache, SynStore, Upsert};
use crate::counter::{SequenceCounter, TickSource};

/// What the dispatcher did with a frame. The frame itself is always delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capture {
    /// SYN recorded under `key`, stamped with `tick`.
    Captured { key: FlowKey, tick: u64 },
    /// Not of interest.
    Passed(PassReason),
    /// Matching SYN, but the store was busy; nothing recorded.
    Dropped { key: FlowKey },
}

#[derive(Debug, Default)]
pub struct CaptureStats {
    captured: AtomicU64,
    passed: AtomicU64,
    dropped: AtomicU64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub captured: u64,
    pub passed: u64,
    pub dropped: u64,
}

impl CaptureStats {
    fn record(&self, capture: &Capture) {
        let counter = match capture {
            Capture::Captured { .. } => &self.captured,
            Capture::Passed(_) => &self.passed,
            Capture::Dropped { .. } => &self.dropped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            captured: self.captured.load(Ordering::Relaxed),
            passed: self.passed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Per-frame entry point of the capture path.
///
/// Cheap to clone; every clone shares the same store, counter and stats and
/// can run concurrently on its own thread.
pub struct CaptureDispatcher<S = FingerprintCache, T = SequenceCounter> {
    store: Arc<S>,
    ticks: Arc<T>,
    filter: FilterConfig,
    stats: Arc<CaptureStats>,
}

impl<S, T> Clone for CaptureDispatcher<S, T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ticks: Arc::clone(&self.ticks),
            filter: self.filter,
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<S: SynStore, T: TickSource> CaptureDispatcher<S, T> {
    pub fn new(store: Arc<S>, ticks: Arc<T>, filter: FilterConfig, stats: Arc<CaptureStats>) -> Self {
        Self { store, ticks, filter, stats }
    }

    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    /// Inspect one inbound frame and record it if it is a matching bare SYN.
    ///
    /// Never fails and never blocks beyond the store's write budget. The tick
    /// is only taken once the store has accepted the write, so dropped
    /// captures leave the counter untouched.
    pub fn on_frame(&self, frame: &[u8]) -> Capture {
        let capture = self.capture(frame);
        self.stats.record(&capture);
        capture
    }

    fn capture(&self, frame: &[u8]) -> Capture {
        let parsed = match parse_frame(frame, &self.filter) {
            Ok(parsed) => parsed,
            Err(reason) => {
                trace!(reason = reason.as_str(), len = frame.len(), "frame passed");
                return Capture::Passed(reason);
            }
        };

        let features = extract_features(frame, &parsed);
        let source_address = parsed.ip.saddr_wire();
        let source_port = parsed.tcp.source_wire();
        let key = FlowKey::from_wire(source_address, source_port);

        let mut tick = 0u64;
        let outcome = self.store.upsert_with(key, || {
            tick = self.ticks.next_tick().unwrap_or(0);
            SynRecord {
                source_address,
                source_port,
                window: parsed.tcp.window_wire(),
                option_length: features.option_length,
                ip_ttl: parsed.ip.ttl(),
                ip_option_length: features.ip_option_length,
                options: features.options,
                quirks: features.quirks,
                sequence_tick: tick,
            }
        });

        match outcome {
            Upsert::Contended => {
                trace!(key = key.as_u64(), "SYN capture dropped: store busy");
                Capture::Dropped { key }
            }
            outcome => {
                trace!(
                    src = %parsed.ip.source(),
                    key = key.as_u64(),
                    tick,
                    quirks = features.quirks,
                    ?outcome,
                    "SYN captured"
                );
                Capture::Captured { key, tick }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huginn_syn_common::testing::SynFrameBuilder;

    /// Store that never grants the write lock.
    struct BusyStore;

    impl SynStore for BusyStore {
        fn upsert_with<F>(&self, _key: FlowKey, _build: F) -> Upsert
        where
            F: FnOnce() -> SynRecord,
        {
            Upsert::Contended
        }

        fn lookup(&self, _key: FlowKey) -> Option<SynRecord> {
            None
        }
    }

    /// Counter whose storage is unreachable.
    struct MissingCounter;

    impl TickSource for MissingCounter {
        fn next_tick(&self) -> Option<u64> {
            None
        }

        fn current_tick(&self) -> Option<u64> {
            None
        }
    }

    #[test]
    fn test_busy_store_drops_without_ticking() {
        let counter = Arc::new(SequenceCounter::new());
        let stats = Arc::new(CaptureStats::default());
        let dispatcher = CaptureDispatcher::new(
            Arc::new(BusyStore),
            Arc::clone(&counter),
            FilterConfig::ANY,
            Arc::clone(&stats),
        );
        let frame = SynFrameBuilder::new().build();
        assert!(matches!(dispatcher.on_frame(frame.as_bytes()), Capture::Dropped { .. }));
        assert_eq!(counter.current(), 0);
        assert_eq!(stats.snapshot(), StatsSnapshot { captured: 0, passed: 0, dropped: 1 });
    }

    #[test]
    fn test_missing_counter_stamps_tick_zero() {
        let cache = Arc::new(FingerprintCache::with_capacity(4));
        let dispatcher = CaptureDispatcher::new(
            Arc::clone(&cache),
            Arc::new(MissingCounter),
            FilterConfig::ANY,
            Arc::new(CaptureStats::default()),
        );
        let frame = SynFrameBuilder::new().build();
        let Capture::Captured { key, tick } = dispatcher.on_frame(frame.as_bytes()) else {
            panic!("SYN not captured");
        };
        assert_eq!(tick, 0);
        assert_eq!(cache.lookup(key).map(|r| r.sequence_tick), Some(0));
    }

    #[test]
    fn test_stats_count_every_outcome() {
        let stats = Arc::new(CaptureStats::default());
        let dispatcher = CaptureDispatcher::new(
            Arc::new(FingerprintCache::with_capacity(4)),
            Arc::new(SequenceCounter::new()),
            FilterConfig::ANY,
            Arc::clone(&stats),
        );
        dispatcher.on_frame(SynFrameBuilder::new().build().as_bytes());
        dispatcher.on_frame(&[0u8; 8]);
        dispatcher.on_frame(SynFrameBuilder::new().protocol(17).build().as_bytes());
        assert_eq!(stats.snapshot(), StatsSnapshot { captured: 1, passed: 2, dropped: 0 });
    }
}
