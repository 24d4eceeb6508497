//! metrology core: key model, instrument capability and error types.
//!
//! This crate defines the contracts shared by the registry and by anything
//! that supplies instruments to it. It carries no locking or runtime
//! dependencies so instrument implementations can depend on it alone.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! All fallible paths surface as `MetrologyError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod instrument;
pub mod key;

/// Shared result type.
pub use error::{ErrorCode, MetrologyError, Result};
pub use instrument::{downcast_arc, AsAny, Instrument, InstrumentId, Stoppable};
pub use key::{MetricKey, MetricName, TagSet};
