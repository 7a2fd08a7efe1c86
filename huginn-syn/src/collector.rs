use std::net::Ipv4Addr;
use std::sync::Arc;

use huginn_syn_common::{quirk_bits, FlowKey, SynRecord};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{FingerprintCache, SynStore};
use crate::counter::{SequenceCounter, TickSource};

/// Default maximum age, in captured SYNs, of an entry served by [`SynCollector::lookup_fresh`].
///
/// Twice [`crate::SYN_MAP_CAPACITY`]: older entries most likely belong to an
/// earlier connection that reused the same source address and port.
pub const STALE_TICK_THRESHOLD: u64 = 16_384;

/// Outcome of a staleness-checked lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynLookup {
    /// Fresh entry for this peer.
    Hit(SynRecord),
    /// No entry (not captured yet, IPv6 client, evicted, or lock budget exceeded).
    Miss,
    /// Entry exists but `age` SYNs have been captured since; likely a reused port.
    Stale { record: SynRecord, age: u64 },
}

/// Read-only view of the capture state for the collector.
///
/// Never writes: only the capture path modifies the store or the counter.
pub struct SynCollector<S = FingerprintCache, T = SequenceCounter> {
    store: Arc<S>,
    ticks: Arc<T>,
    stale_tick_threshold: u64,
}

impl<S, T> Clone for SynCollector<S, T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ticks: Arc::clone(&self.ticks),
            stale_tick_threshold: self.stale_tick_threshold,
        }
    }
}

impl<S: SynStore, T: TickSource> SynCollector<S, T> {
    pub fn new(store: Arc<S>, ticks: Arc<T>, stale_tick_threshold: u64) -> Self {
        Self { store, ticks, stale_tick_threshold }
    }

    pub fn stale_tick_threshold(&self) -> u64 {
        self.stale_tick_threshold
    }

    /// Current value of the global SYN counter (0 if unreadable).
    pub fn current_tick(&self) -> u64 {
        self.ticks.current_tick().unwrap_or(0)
    }

    /// Raw record for a client, without any staleness policy.
    pub fn lookup_by_flow(&self, source_ip: Ipv4Addr, source_port: u16) -> Option<SynRecord> {
        self.lookup_key(FlowKey::from_flow(source_ip, source_port))
    }

    pub fn lookup_key(&self, key: FlowKey) -> Option<SynRecord> {
        self.store.lookup(key)
    }

    /// Look up the SYN for a client connection and reject stale entries.
    ///
    /// Meant to be called right after the connection is accepted.
    pub fn lookup_fresh(&self, source_ip: Ipv4Addr, source_port: u16) -> SynLookup {
        let Some(record) = self.lookup_by_flow(source_ip, source_port) else {
            debug!(?source_ip, source_port, "SYN map miss: no entry (keep-alive or not captured)");
            return SynLookup::Miss;
        };

        let current_tick = self.current_tick();
        let age = current_tick.saturating_sub(record.sequence_tick);
        if age > self.stale_tick_threshold {
            warn!(
                ?source_ip,
                source_port,
                stored_tick = record.sequence_tick,
                current_tick,
                age,
                threshold = self.stale_tick_threshold,
                "SYN map entry is stale, discarding"
            );
            return SynLookup::Stale { record, age };
        }
        SynLookup::Hit(record)
    }
}

/// Host-order rendition of a [`SynRecord`] for export.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SynRecordView {
    pub source_ip: Ipv4Addr,
    pub source_port: u16,
    pub window: u16,
    pub ip_ttl: u8,
    pub ip_option_length: u8,
    pub option_length: u16,
    pub options_truncated: bool,
    pub options: Vec<u8>,
    pub quirks: Vec<&'static str>,
    pub sequence_tick: u64,
}

impl From<&SynRecord> for SynRecordView {
    fn from(record: &SynRecord) -> Self {
        Self {
            source_ip: record.source_ip(),
            source_port: record.source_port_host(),
            window: record.window_host(),
            ip_ttl: record.ip_ttl,
            ip_option_length: record.ip_option_length,
            option_length: record.option_length,
            options_truncated: record.options_truncated(),
            options: record.captured_options().to_vec(),
            quirks: quirk_bits::names(record.quirks).collect(),
            sequence_tick: record.sequence_tick,
        }
    }
}
