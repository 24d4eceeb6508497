//! Typed constructors over `get_or_create` / `install`.

use std::sync::Arc;

use metrology_core::{MetricName, Result};

use crate::instruments::{
    Counter, Derive, Gauge, HealthCheck, HistogramUniform, Meter, Profiler, Timer, UtilizationTimer,
};

use super::Registry;

impl Registry {
    pub fn counter(&self, name: impl Into<MetricName>) -> Result<Arc<Counter>> {
        self.get_or_create(name)
    }

    pub fn derive(&self, name: impl Into<MetricName>) -> Result<Arc<Derive>> {
        self.get_or_create(name)
    }

    pub fn meter(&self, name: impl Into<MetricName>) -> Result<Arc<Meter>> {
        self.get_or_create(name)
    }

    pub fn gauge(&self, name: impl Into<MetricName>) -> Result<Arc<Gauge>> {
        self.get_or_create(name)
    }

    /// Install a custom gauge (e.g. [`crate::instruments::FnGauge`]),
    /// replacing whatever is registered under `name`.
    pub fn gauge_with<T: metrology_core::Instrument>(&self, name: impl Into<MetricName>, gauge: Arc<T>) -> Arc<T> {
        self.install(name, gauge)
    }

    pub fn timer(&self, name: impl Into<MetricName>) -> Result<Arc<Timer>> {
        let size = self.defaults().reservoir_size;
        self.get_or_create_with(name, || Timer::with_reservoir(size))
    }

    pub fn utilization_timer(&self, name: impl Into<MetricName>) -> Result<Arc<UtilizationTimer>> {
        let size = self.defaults().reservoir_size;
        self.get_or_create_with(name, || UtilizationTimer::with_reservoir(size))
    }

    pub fn histogram(&self, name: impl Into<MetricName>) -> Result<Arc<HistogramUniform>> {
        let size = self.defaults().reservoir_size;
        self.get_or_create_with(name, || HistogramUniform::with_size(size))
    }

    /// Install a custom histogram, replacing whatever is registered under `name`.
    pub fn histogram_with<T: metrology_core::Instrument>(&self, name: impl Into<MetricName>, histogram: Arc<T>) -> Arc<T> {
        self.install(name, histogram)
    }

    /// Health checks carry their own logic, so they are always installed.
    pub fn health_check<T: HealthCheck>(&self, name: impl Into<MetricName>, check: Arc<T>) -> Arc<T> {
        self.install(name, check)
    }

    pub fn profiler(&self, name: impl Into<MetricName>) -> Result<Arc<Profiler>> {
        let size = self.defaults().reservoir_size;
        self.get_or_create_with(name, || Profiler::with_reservoir(size))
    }
}
