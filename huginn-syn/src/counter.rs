use std::sync::atomic::{AtomicU64, Ordering};

/// Source of capture ticks.
///
/// `None` means the counter storage is unreachable; the capture path then
/// stamps the record with tick 0 instead of aborting.
pub trait TickSource: Send + Sync {
    /// Take the next tick (fetch-and-add semantics).
    fn next_tick(&self) -> Option<u64>;

    /// Current value without advancing it.
    fn current_tick(&self) -> Option<u64>;
}

/// Global SYN counter used as a logical clock for stale-entry detection.
///
/// Starts at 0 and is advanced once per captured SYN. Wraps on overflow.
#[derive(Debug, Default)]
pub struct SequenceCounter {
    value: AtomicU64,
}

impl SequenceCounter {
    pub const fn new() -> Self {
        Self { value: AtomicU64::new(0) }
    }

    /// Increment and return the pre-increment value.
    #[inline]
    pub fn next(&self) -> u64 {
        self.value.fetch_add(1, Ordering::AcqRel)
    }

    /// Wait-free read of the current value.
    #[inline]
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }
}

impl TickSource for SequenceCounter {
    fn next_tick(&self) -> Option<u64> {
        Some(self.next())
    }

    fn current_tick(&self) -> Option<u64> {
        Some(self.current())
    }
}
