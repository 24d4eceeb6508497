//! Process-wide default registry.
//!
//! Nothing is created implicitly: call [`init_default`] (or
//! [`install_default`]) at startup and [`teardown_default`] at shutdown.
//! Until then the `register_*` helpers fail with `NotInitialized`.
//! Code that can carry an explicit `Arc<Registry>` should prefer it.

use std::sync::Arc;

use parking_lot::RwLock;

use metrology_core::error::{MetrologyError, Result};
use metrology_core::{Instrument, MetricName};

use crate::instruments::{
    Counter, Derive, Gauge, HealthCheck, HistogramUniform, Meter, Profiler, Timer, UtilizationTimer,
};
use crate::registry::Registry;

static DEFAULT: RwLock<Option<Arc<Registry>>> = RwLock::new(None);

/// Install `registry` as the default, returning the previous one (not cleared).
pub fn install_default(registry: Arc<Registry>) -> Option<Arc<Registry>> {
    let mut slot = DEFAULT.write();
    tracing::debug!("default registry installed");
    slot.replace(registry)
}

/// Return the default registry, creating and installing an empty one if
/// none is installed.
pub fn init_default() -> Arc<Registry> {
    let mut slot = DEFAULT.write();
    let registry = slot.get_or_insert_with(|| {
        tracing::debug!("default registry created");
        Arc::new(Registry::new())
    });
    Arc::clone(registry)
}

pub fn default_registry() -> Result<Arc<Registry>> {
    let slot = DEFAULT.read();
    slot.as_ref().map(Arc::clone).ok_or(MetrologyError::NotInitialized)
}

/// Uninstall the default registry and clear it (stop hooks run).
/// Returns false if nothing was installed.
pub fn teardown_default() -> bool {
    let taken = DEFAULT.write().take();
    match taken {
        Some(registry) => {
            // stop hooks may touch the default slot; lock is released here
            registry.stop();
            tracing::debug!("default registry torn down");
            true
        }
        None => false,
    }
}

pub fn get(name: impl Into<MetricName>) -> Result<Arc<dyn Instrument>> {
    default_registry()?.get(name)
}

pub fn register_counter(name: impl Into<MetricName>) -> Result<Arc<Counter>> {
    default_registry()?.counter(name)
}

pub fn register_derive(name: impl Into<MetricName>) -> Result<Arc<Derive>> {
    default_registry()?.derive(name)
}

pub fn register_meter(name: impl Into<MetricName>) -> Result<Arc<Meter>> {
    default_registry()?.meter(name)
}

pub fn register_gauge(name: impl Into<MetricName>) -> Result<Arc<Gauge>> {
    default_registry()?.gauge(name)
}

pub fn register_gauge_with<T: Instrument>(name: impl Into<MetricName>, gauge: Arc<T>) -> Result<Arc<T>> {
    Ok(default_registry()?.gauge_with(name, gauge))
}

pub fn register_timer(name: impl Into<MetricName>) -> Result<Arc<Timer>> {
    default_registry()?.timer(name)
}

pub fn register_utilization_timer(name: impl Into<MetricName>) -> Result<Arc<UtilizationTimer>> {
    default_registry()?.utilization_timer(name)
}

pub fn register_histogram(name: impl Into<MetricName>) -> Result<Arc<HistogramUniform>> {
    default_registry()?.histogram(name)
}

pub fn register_histogram_with<T: Instrument>(
    name: impl Into<MetricName>,
    histogram: Arc<T>,
) -> Result<Arc<T>> {
    Ok(default_registry()?.histogram_with(name, histogram))
}

pub fn register_health_check<T: HealthCheck>(name: impl Into<MetricName>, check: Arc<T>) -> Result<Arc<T>> {
    Ok(default_registry()?.health_check(name, check))
}

pub fn register_profiler(name: impl Into<MetricName>) -> Result<Arc<Profiler>> {
    default_registry()?.profiler(name)
}
