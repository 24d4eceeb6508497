use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use metrology_core::{Instrument, Stoppable};

/// Event meter: total count and mean rate since creation.
/// Stopping freezes the clock and ignores further marks.
#[derive(Debug)]
pub struct Meter {
    count: AtomicU64,
    started: Instant,
    stopped_at: OnceLock<Instant>,
}

impl Default for Meter {
    fn default() -> Self {
        Self {
            count: AtomicU64::new(0),
            started: Instant::now(),
            stopped_at: OnceLock::new(),
        }
    }
}

impl Meter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self) {
        self.mark_n(1);
    }

    pub fn mark_n(&self, n: u64) {
        if self.is_stopped() {
            tracing::trace!("mark on stopped meter ignored");
            return;
        }
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        let end = self.stopped_at.get().copied().unwrap_or_else(Instant::now);
        end.saturating_duration_since(self.started)
    }

    /// Events per second since creation (or until stop).
    pub fn mean_rate(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.count() as f64 / secs
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped_at.get().is_some()
    }
}

impl Stoppable for Meter {
    fn stop(&self) {
        let _ = self.stopped_at.set(Instant::now());
    }
}

impl Instrument for Meter {
    fn kind(&self) -> &'static str {
        "meter"
    }

    fn as_stoppable(&self) -> Option<&dyn Stoppable> {
        Some(self)
    }
}
