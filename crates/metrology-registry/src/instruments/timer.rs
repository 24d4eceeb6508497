use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use metrology_core::{Instrument, Stoppable};

use super::{HistogramUniform, Meter, DEFAULT_RESERVOIR_SIZE};

/// Duration recorder: a histogram of microseconds plus a call-rate meter.
#[derive(Debug)]
pub struct Timer {
    histogram: HistogramUniform,
    meter: Meter,
}

impl Default for Timer {
    fn default() -> Self {
        Self::with_reservoir(DEFAULT_RESERVOIR_SIZE)
    }
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reservoir(size: usize) -> Self {
        Self {
            histogram: HistogramUniform::with_size(size),
            meter: Meter::new(),
        }
    }

    pub fn update(&self, d: Duration) {
        self.histogram.update(d.as_micros().min(i64::MAX as u128) as i64);
        self.meter.mark();
    }

    /// Start timing; the duration is recorded when the context drops.
    pub fn time(&self) -> TimerContext<'_> {
        TimerContext {
            timer: self,
            start: Instant::now(),
        }
    }

    /// Time a closure.
    pub fn time_fn<R>(&self, f: impl FnOnce() -> R) -> R {
        let _ctx = self.time();
        f()
    }

    pub fn count(&self) -> u64 {
        self.histogram.count()
    }

    /// Mean duration in microseconds.
    pub fn mean_micros(&self) -> Option<f64> {
        self.histogram.mean()
    }

    pub fn percentile_micros(&self, q: f64) -> Option<i64> {
        self.histogram.percentile(q)
    }

    pub fn mean_rate(&self) -> f64 {
        self.meter.mean_rate()
    }

    pub fn is_stopped(&self) -> bool {
        self.meter.is_stopped()
    }
}

impl Stoppable for Timer {
    fn stop(&self) {
        self.meter.stop();
    }
}

impl Instrument for Timer {
    fn kind(&self) -> &'static str {
        "timer"
    }

    fn as_stoppable(&self) -> Option<&dyn Stoppable> {
        Some(self)
    }
}

/// RAII timing scope returned by [`Timer::time`].
#[must_use = "the duration is recorded when the context is dropped"]
pub struct TimerContext<'a> {
    timer: &'a Timer,
    start: Instant,
}

impl Drop for TimerContext<'_> {
    fn drop(&mut self) {
        self.timer.update(self.start.elapsed());
    }
}

/// Timer that also accumulates busy time, to report the fraction of
/// wall-clock time spent inside timed sections.
#[derive(Debug, Default)]
pub struct UtilizationTimer {
    timer: Timer,
    busy_micros: AtomicU64,
}

impl UtilizationTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reservoir(size: usize) -> Self {
        Self {
            timer: Timer::with_reservoir(size),
            busy_micros: AtomicU64::new(0),
        }
    }

    pub fn update(&self, d: Duration) {
        self.timer.update(d);
        self.busy_micros
            .fetch_add(d.as_micros().min(u64::MAX as u128) as u64, Ordering::Relaxed);
    }

    pub fn time_fn<R>(&self, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let out = f();
        self.update(start.elapsed());
        out
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn busy(&self) -> Duration {
        Duration::from_micros(self.busy_micros.load(Ordering::Relaxed))
    }

    /// Busy time divided by time since creation (0.0 when no time passed).
    pub fn utilization(&self) -> f64 {
        let wall = self.timer.meter.elapsed().as_secs_f64();
        if wall <= 0.0 {
            return 0.0;
        }
        self.busy().as_secs_f64() / wall
    }
}

impl Stoppable for UtilizationTimer {
    fn stop(&self) {
        self.timer.stop();
    }
}

impl Instrument for UtilizationTimer {
    fn kind(&self) -> &'static str {
        "utilization_timer"
    }

    fn as_stoppable(&self) -> Option<&dyn Stoppable> {
        Some(self)
    }
}
