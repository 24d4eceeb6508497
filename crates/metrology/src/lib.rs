//! Top-level facade crate for metrology.
//!
//! Re-exports core types and the registry library so users can depend on a single crate.

pub mod core {
    pub use metrology_core::*;
}

pub mod registry {
    pub use metrology_registry::*;
}

pub use metrology_core::{MetricName, MetrologyError, Result, TagSet};
pub use metrology_registry::Registry;
