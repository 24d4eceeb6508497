//! Registry config loader (strict parsing).

pub mod schema;

use std::fs;

use metrology_core::error::{MetrologyError, Result};

use crate::registry::{Registry, RegistryDefaults};

pub use schema::{DefaultsSection, InstrumentDecl, InstrumentKind, RegistryConfig};

pub fn load_from_file(path: &str) -> Result<RegistryConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MetrologyError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<RegistryConfig> {
    let cfg: RegistryConfig = serde_yaml::from_str(s)
        .map_err(|e| MetrologyError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Registry {
    /// Build a registry with the configured defaults and pre-register the
    /// declared instruments. A name declared twice with different kinds
    /// fails with `TypeMismatch`.
    pub fn from_config(cfg: &RegistryConfig) -> Result<Self> {
        let registry = Registry::with_defaults(RegistryDefaults {
            reservoir_size: cfg.defaults.reservoir_size,
        });

        for decl in &cfg.instruments {
            let name = decl.metric_name()?;
            match decl.kind {
                InstrumentKind::Counter => {
                    registry.counter(name)?;
                }
                InstrumentKind::Derive => {
                    registry.derive(name)?;
                }
                InstrumentKind::Meter => {
                    registry.meter(name)?;
                }
                InstrumentKind::Gauge => {
                    registry.gauge(name)?;
                }
                InstrumentKind::Timer => {
                    registry.timer(name)?;
                }
                InstrumentKind::Histogram => {
                    registry.histogram(name)?;
                }
                InstrumentKind::UtilizationTimer => {
                    registry.utilization_timer(name)?;
                }
                InstrumentKind::Profiler => {
                    registry.profiler(name)?;
                }
            }
        }

        tracing::debug!(instruments = registry.len(), "registry built from config");
        Ok(registry)
    }
}
