use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use metrology_core::Instrument;

/// Default number of samples kept by a uniform reservoir.
pub const DEFAULT_RESERVOIR_SIZE: usize = 1028;

/// Histogram over a uniform random sample of all recorded values
/// (Vitter's algorithm R). `count`, `min`, `max` and `mean` are exact;
/// percentiles come from the sample.
#[derive(Debug)]
pub struct HistogramUniform {
    size: usize,
    inner: Mutex<Reservoir>,
}

#[derive(Debug)]
struct Reservoir {
    values: Vec<i64>,
    count: u64,
    sum: i128,
    min: i64,
    max: i64,
    rng: StdRng,
}

impl Default for HistogramUniform {
    fn default() -> Self {
        Self::with_size(DEFAULT_RESERVOIR_SIZE)
    }
}

impl HistogramUniform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reservoir with room for `size` samples (at least 1).
    pub fn with_size(size: usize) -> Self {
        let size = size.max(1);
        Self {
            size,
            inner: Mutex::new(Reservoir {
                values: Vec::with_capacity(size.min(DEFAULT_RESERVOIR_SIZE)),
                count: 0,
                sum: 0,
                min: i64::MAX,
                max: i64::MIN,
                rng: StdRng::from_entropy(),
            }),
        }
    }

    pub fn reservoir_size(&self) -> usize {
        self.size
    }

    pub fn update(&self, value: i64) {
        let mut r = self.inner.lock();
        r.count += 1;
        r.sum += value as i128;
        r.min = r.min.min(value);
        r.max = r.max.max(value);

        if r.values.len() < self.size {
            r.values.push(value);
        } else {
            let count = r.count;
            let slot = r.rng.gen_range(0..count);
            if let Some(v) = r.values.get_mut(slot as usize) {
                *v = value;
            }
        }
    }

    pub fn count(&self) -> u64 {
        self.inner.lock().count
    }

    pub fn min(&self) -> Option<i64> {
        let r = self.inner.lock();
        (r.count > 0).then_some(r.min)
    }

    pub fn max(&self) -> Option<i64> {
        let r = self.inner.lock();
        (r.count > 0).then_some(r.max)
    }

    pub fn mean(&self) -> Option<f64> {
        let r = self.inner.lock();
        (r.count > 0).then(|| r.sum as f64 / r.count as f64)
    }

    /// Value at quantile `q` (0.0..=1.0) of the current sample.
    pub fn percentile(&self, q: f64) -> Option<i64> {
        let mut sample = self.snapshot();
        if sample.is_empty() {
            return None;
        }
        sample.sort_unstable();
        let q = q.clamp(0.0, 1.0);
        let idx = ((sample.len() - 1) as f64 * q).round() as usize;
        sample.get(idx).copied()
    }

    /// Copy of the current sample.
    pub fn snapshot(&self) -> Vec<i64> {
        self.inner.lock().values.clone()
    }
}

impl Instrument for HistogramUniform {
    fn kind(&self) -> &'static str {
        "histogram"
    }
}
