//! Instrument registry (get-or-create store + tag index).
//!
//! Every typed constructor funnels into `get_or_create` (default type) or
//! `install` (pre-built instance). The tag index is maintained eagerly on
//! every registration under a tag-set key.

mod constructors;
#[allow(clippy::module_inception)]
mod registry;
mod tag_index;

pub use registry::{CatalogEntry, Filtered, Registry, RegistryDefaults, Snapshot};
