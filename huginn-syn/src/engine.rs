use std::sync::Arc;

use huginn_syn_common::FilterConfig;
use tracing::{debug, info};

use crate::cache::FingerprintCache;
use crate::collector::{SynCollector, STALE_TICK_THRESHOLD};
use crate::config::CaptureConfig;
use crate::counter::SequenceCounter;
use crate::dispatcher::{CaptureDispatcher, CaptureStats, StatsSnapshot};

/// Owns the shared capture state and hands out the two sides of it.
///
/// The dispatcher side is what the frame hook runs; the collector side is
/// what the accept path queries. Both see the same store and counter.
pub struct SynCapture {
    cache: Arc<FingerprintCache>,
    counter: Arc<SequenceCounter>,
    stats: Arc<CaptureStats>,
    filter: FilterConfig,
    stale_tick_threshold: u64,
}

impl SynCapture {
    pub fn new(filter: FilterConfig) -> Self {
        Self::with_parts(filter, FingerprintCache::new(), STALE_TICK_THRESHOLD)
    }

    pub fn from_config(cfg: &CaptureConfig) -> Self {
        Self::with_parts(cfg.filter(), FingerprintCache::new(), cfg.collector.stale_tick_threshold)
    }

    /// Engine over a caller-sized cache.
    pub fn with_parts(filter: FilterConfig, cache: FingerprintCache, stale_tick_threshold: u64) -> Self {
        info!(
            dst_ip = ?filter.dst_ip(),
            dst_port = ?filter.dst_port(),
            capacity = cache.capacity(),
            stale_tick_threshold,
            "SYN capture ready"
        );
        Self {
            cache: Arc::new(cache),
            counter: Arc::new(SequenceCounter::new()),
            stats: Arc::new(CaptureStats::default()),
            filter,
            stale_tick_threshold,
        }
    }

    pub fn dispatcher(&self) -> CaptureDispatcher {
        CaptureDispatcher::new(
            Arc::clone(&self.cache),
            Arc::clone(&self.counter),
            self.filter,
            Arc::clone(&self.stats),
        )
    }

    pub fn collector(&self) -> SynCollector {
        SynCollector::new(Arc::clone(&self.cache), Arc::clone(&self.counter), self.stale_tick_threshold)
    }

    pub fn cache(&self) -> &FingerprintCache {
        &self.cache
    }

    pub fn filter(&self) -> FilterConfig {
        self.filter
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Drop every captured record. The counter keeps its value.
    pub fn shutdown(&self) {
        let stats = self.stats.snapshot();
        self.cache.clear();
        debug!(
            captured = stats.captured,
            passed = stats.passed,
            dropped = stats.dropped,
            "SYN capture shut down"
        );
    }
}
