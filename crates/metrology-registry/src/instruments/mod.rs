//! Default instrument set used by the registry's typed constructors.
//!
//! Measurement logic here is intentionally small: lock-free atomics for
//! counters/meters/gauges and a mutex-guarded reservoir for histograms.
//! Custom instruments implement [`metrology_core::Instrument`] and are
//! installed through `Registry::install` or the `*_with` constructors.

mod counter;
mod gauge;
mod health;
mod histogram;
mod meter;
mod profiler;
mod timer;

pub use counter::{Counter, Derive};
pub use gauge::{FnGauge, Gauge};
pub use health::{FnHealthCheck, HealthCheck};
pub use histogram::{HistogramUniform, DEFAULT_RESERVOIR_SIZE};
pub use meter::Meter;
pub use profiler::Profiler;
pub use timer::{Timer, TimerContext, UtilizationTimer};
