use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use metrology_core::Instrument;

/// Settable gauge (f64 stored as bits).
#[derive(Debug)]
pub struct Gauge {
    bits: AtomicU64,
}

impl Default for Gauge {
    fn default() -> Self {
        Self { bits: AtomicU64::new(0f64.to_bits()) }
    }
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, v: f64) {
        self.bits.store(v.to_bits(), Ordering::Relaxed);
    }

    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

impl Instrument for Gauge {
    fn kind(&self) -> &'static str {
        "gauge"
    }
}

/// Gauge computed on read from captured state.
pub struct FnGauge {
    f: Box<dyn Fn() -> f64 + Send + Sync>,
}

impl FnGauge {
    pub fn new(f: impl Fn() -> f64 + Send + Sync + 'static) -> Self {
        Self { f: Box::new(f) }
    }

    pub fn value(&self) -> f64 {
        (self.f)()
    }
}

impl fmt::Debug for FnGauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnGauge").finish_non_exhaustive()
    }
}

impl Instrument for FnGauge {
    fn kind(&self) -> &'static str {
        "gauge"
    }
}
