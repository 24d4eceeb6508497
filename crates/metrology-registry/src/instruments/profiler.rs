use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use metrology_core::{Instrument, Stoppable};

use super::{Timer, DEFAULT_RESERVOIR_SIZE};

/// Named-section profiler: one [`Timer`] per section, created on first use.
#[derive(Debug)]
pub struct Profiler {
    reservoir_size: usize,
    sections: Mutex<HashMap<String, Arc<Timer>>>,
}

impl Default for Profiler {
    fn default() -> Self {
        Self::with_reservoir(DEFAULT_RESERVOIR_SIZE)
    }
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reservoir(reservoir_size: usize) -> Self {
        Self {
            reservoir_size,
            sections: Mutex::new(HashMap::new()),
        }
    }

    pub fn section(&self, name: &str) -> Arc<Timer> {
        let mut sections = self.sections.lock();
        let timer = sections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Timer::with_reservoir(self.reservoir_size)));
        Arc::clone(timer)
    }

    /// Run `f` timed under `section`.
    pub fn profile<R>(&self, section: &str, f: impl FnOnce() -> R) -> R {
        let timer = self.section(section);
        timer.time_fn(f)
    }

    /// Section names, sorted.
    pub fn sections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sections.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Stoppable for Profiler {
    fn stop(&self) {
        for timer in self.sections.lock().values() {
            timer.stop();
        }
    }
}

impl Instrument for Profiler {
    fn kind(&self) -> &'static str {
        "profiler"
    }

    fn as_stoppable(&self) -> Option<&dyn Stoppable> {
        Some(self)
    }
}
