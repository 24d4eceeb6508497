//! metrology registry library entry.
//!
//! This crate owns the instrument registry: the lock-guarded name ->
//! instrument map, its get-or-create semantics and the tag index used to
//! query instruments by attached metadata. It also ships the default
//! instrument set, strict YAML configuration and an explicitly managed
//! process-wide default registry.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod global;
pub mod instruments;
pub mod registry;

pub use registry::{CatalogEntry, Filtered, Registry, RegistryDefaults, Snapshot};
