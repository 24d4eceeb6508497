use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use metrology_core::Instrument;

/// Signed up/down counter.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicI64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment by 1.
    pub fn inc(&self) {
        self.inc_by(1);
    }

    pub fn inc_by(&self, v: i64) {
        self.value.fetch_add(v, Ordering::Relaxed);
    }

    /// Decrement by 1.
    pub fn dec(&self) {
        self.inc_by(-1);
    }

    pub fn dec_by(&self, v: i64) {
        self.inc_by(-v);
    }

    pub fn count(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.value.store(0, Ordering::Relaxed);
    }
}

impl Instrument for Counter {
    fn kind(&self) -> &'static str {
        "counter"
    }
}

/// Tracks growth of an externally maintained, monotonically increasing
/// value (e.g. bytes read from `/proc`). Each `mark` adds the delta since
/// the previous mark; a value lower than the previous one is a reset and
/// adds nothing.
#[derive(Debug, Default)]
pub struct Derive {
    last: AtomicU64,
    total: AtomicU64,
}

impl Derive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, value: u64) {
        let prev = self.last.swap(value, Ordering::AcqRel);
        if value >= prev {
            self.total.fetch_add(value - prev, Ordering::Relaxed);
        }
    }

    /// Sum of deltas observed so far.
    pub fn count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl Instrument for Derive {
    fn kind(&self) -> &'static str {
        "derive"
    }
}
