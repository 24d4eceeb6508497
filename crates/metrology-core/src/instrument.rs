//! Instrument capability surface.
//!
//! The registry never looks at measurements. It only needs:
//! - the concrete type of an instrument (type-checked lookups),
//! - an optional stop hook, invoked when the registry is cleared.

use std::any::Any;
use std::sync::Arc;

/// Object-safe bridge to `Any` for shared instruments.
/// Implemented for every sized `Send + Sync + 'static` type.
pub trait AsAny: Any + Send + Sync {
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
    /// Concrete type name of the instrument.
    fn instrument_type(&self) -> &'static str;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn instrument_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A measurement primitive managed by the registry.
pub trait Instrument: AsAny {
    /// Short kind label (`counter`, `meter`, ...), used in logs and listings.
    fn kind(&self) -> &'static str;

    /// Stop capability, for instruments that need teardown.
    fn as_stoppable(&self) -> Option<&dyn Stoppable> {
        None
    }
}

/// Optional teardown capability.
pub trait Stoppable {
    fn stop(&self);
}

/// Identity of a shared instrument instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstrumentId(usize);

impl InstrumentId {
    pub fn of(instrument: &Arc<dyn Instrument>) -> Self {
        Self(Arc::as_ptr(instrument) as *const () as usize)
    }
}

/// Downcast a stored instrument to its concrete type (exact match only).
pub fn downcast_arc<T: Instrument>(instrument: Arc<dyn Instrument>) -> Option<Arc<T>> {
    instrument.into_any_arc().downcast::<T>().ok()
}
