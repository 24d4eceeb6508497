use std::collections::BTreeMap;

use serde::Deserialize;
use metrology_core::error::{MetrologyError, Result};
use metrology_core::{MetricName, TagSet};

use crate::instruments::DEFAULT_RESERVOIR_SIZE;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    pub version: u32,

    #[serde(default)]
    pub defaults: DefaultsSection,

    #[serde(default)]
    pub instruments: Vec<InstrumentDecl>,
}

impl RegistryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetrologyError::BadConfig(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.defaults.validate()?;

        for (i, decl) in self.instruments.iter().enumerate() {
            decl.validate()
                .map_err(|e| MetrologyError::BadConfig(format!("instruments[{i}]: {e}")))?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsSection {
    #[serde(default = "default_reservoir_size")]
    pub reservoir_size: usize,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            reservoir_size: default_reservoir_size(),
        }
    }
}

impl DefaultsSection {
    pub fn validate(&self) -> Result<()> {
        if !(16..=65536).contains(&self.reservoir_size) {
            return Err(MetrologyError::BadConfig(
                "defaults.reservoir_size must be between 16 and 65536".into(),
            ));
        }
        Ok(())
    }
}

fn default_reservoir_size() -> usize {
    DEFAULT_RESERVOIR_SIZE
}

/// Instrument kinds that can be declared up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    Counter,
    Derive,
    Meter,
    Gauge,
    Timer,
    Histogram,
    UtilizationTimer,
    Profiler,
}

/// One pre-registered instrument: `kind` plus exactly one of `name`/`tags`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstrumentDecl {
    pub kind: InstrumentKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
}

impl InstrumentDecl {
    pub fn validate(&self) -> Result<()> {
        match (&self.name, &self.tags) {
            (Some(_), Some(_)) => Err(MetrologyError::BadConfig(
                "name and tags are mutually exclusive".into(),
            )),
            (None, None) => Err(MetrologyError::BadConfig("name or tags required".into())),
            (Some(n), None) if n.trim().is_empty() => {
                Err(MetrologyError::BadConfig("name must not be empty".into()))
            }
            (None, Some(t)) if t.is_empty() => {
                Err(MetrologyError::BadConfig("tags must not be empty".into()))
            }
            _ => Ok(()),
        }
    }

    /// Registry name for this declaration (call after `validate`).
    pub fn metric_name(&self) -> Result<MetricName> {
        match (&self.name, &self.tags) {
            (Some(n), None) => Ok(MetricName::from(n)),
            (None, Some(t)) => Ok(MetricName::from(t.iter().collect::<TagSet>())),
            _ => Err(MetrologyError::BadConfig("name or tags required".into())),
        }
    }
}
