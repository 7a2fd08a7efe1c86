//! Bounded LRU store of captured SYN records.
//!
//! Backed by an [`LruCache`] of at most `capacity` entries. Once full, every
//! new key takes the place of the least recently written entry, reusing its
//! storage.

use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;

use ahash::RandomState;
use huginn_syn_common::{FlowKey, SynRecord};
use lru::LruCache;
use parking_lot::RwLock;

/// Capacity of the SYN fingerprint map.
pub const SYN_MAP_CAPACITY: usize = 8192;

/// Longest the capture path waits for the write lock before dropping a capture.
const WRITE_LOCK_BUDGET: Duration = Duration::from_micros(200);

/// Longest a collector lookup waits for the read lock before reporting a miss.
const READ_LOCK_BUDGET: Duration = Duration::from_millis(5);

/// Outcome of a write into a [`SynStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upsert {
    /// New key, free slot available.
    Inserted,
    /// Existing key overwritten in place.
    Updated,
    /// New key; the least recently used entry was evicted to make room.
    Evicted { key: FlowKey },
    /// Write lock not obtained within budget; nothing written.
    Contended,
}

/// Store the capture path writes through.
pub trait SynStore: Send + Sync {
    /// Insert or overwrite the record for `key` and mark it most recently used.
    ///
    /// `build` is only invoked once the store is ready to accept the write, so
    /// a [`Upsert::Contended`] outcome never consumes anything `build` captures.
    fn upsert_with<F>(&self, key: FlowKey, build: F) -> Upsert
    where
        F: FnOnce() -> SynRecord;

    fn upsert(&self, key: FlowKey, record: SynRecord) -> Upsert {
        self.upsert_with(key, || record)
    }

    /// Copy of the record for `key`. Does not affect recency.
    fn lookup(&self, key: FlowKey) -> Option<SynRecord>;
}

type SynLru = LruCache<FlowKey, SynRecord, RandomState>;

fn upsert_into<F>(lru: &mut SynLru, key: FlowKey, build: F) -> Upsert
where
    F: FnOnce() -> SynRecord,
{
    // get_mut promotes the entry to most recently used
    if let Some(slot) = lru.get_mut(&key) {
        *slot = build();
        return Upsert::Updated;
    }
    match lru.push(key, build()) {
        Some((evicted, _)) => Upsert::Evicted { key: evicted },
        None => Upsert::Inserted,
    }
}

/// Bounded, least-recently-used fingerprint store keyed by [`FlowKey`].
///
/// Writers and readers share a reader/writer lock with bounded waits: a
/// writer that cannot get in quickly gives up ([`Upsert::Contended`]), and
/// lookups run concurrently with each other. Records are copied in and out
/// under the lock, so a reader never sees a partially written record.
///
/// `len`, `contains`, `oldest` and `clear` are control-plane accessors for
/// shutdown, tests and diagnostics. They wait for the lock without a budget
/// and must not be called from the capture or lookup path.
pub struct FingerprintCache {
    inner: RwLock<SynLru>,
    capacity: NonZeroUsize,
}

impl FingerprintCache {
    pub fn new() -> Self {
        Self::with_capacity(SYN_MAP_CAPACITY)
    }

    /// Cache holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: RwLock::new(LruCache::with_hasher(capacity, RandomState::new())),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: FlowKey) -> bool {
        self.inner.read().contains(&key)
    }

    /// Key that the next insertion of a new key would evict once full.
    pub fn oldest(&self) -> Option<FlowKey> {
        self.inner.read().peek_lru().map(|(key, _)| *key)
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

impl Default for FingerprintCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FingerprintCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FingerprintCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

impl SynStore for FingerprintCache {
    fn upsert_with<F>(&self, key: FlowKey, build: F) -> Upsert
    where
        F: FnOnce() -> SynRecord,
    {
        match self.inner.try_write_for(WRITE_LOCK_BUDGET) {
            Some(mut lru) => upsert_into(&mut lru, key, build),
            None => Upsert::Contended,
        }
    }

    fn lookup(&self, key: FlowKey) -> Option<SynRecord> {
        self.inner.try_read_for(READ_LOCK_BUDGET)?.peek(&key).copied()
    }
}
