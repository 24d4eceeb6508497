use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use serde::Serialize;

use metrology_core::error::{MetrologyError, Result};
use metrology_core::{downcast_arc, AsAny, Instrument, InstrumentId, MetricKey, MetricName, TagSet};

use super::tag_index::TagIndex;

/// Defaults applied by the typed constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryDefaults {
    /// Reservoir size for uniform histograms and timers.
    pub reservoir_size: usize,
}

impl Default for RegistryDefaults {
    fn default() -> Self {
        Self {
            reservoir_size: crate::instruments::DEFAULT_RESERVOIR_SIZE,
        }
    }
}

struct Entry {
    instrument: Arc<dyn Instrument>,
    tags: Option<TagSet>,
}

#[derive(Default)]
struct RegistryState {
    metrics: HashMap<MetricKey, Entry>,
    index: TagIndex,
}

impl RegistryState {
    fn insert(&mut self, key: MetricKey, name: &MetricName, instrument: Arc<dyn Instrument>) -> Option<Entry> {
        let tags = name.tags().cloned();
        let replaced = self.metrics.insert(
            key,
            Entry {
                instrument: Arc::clone(&instrument),
                tags: tags.clone(),
            },
        );
        if let Some(old) = &replaced {
            if let Some(old_tags) = &old.tags {
                self.index.unindex(old_tags, &old.instrument);
                self.reindex_survivors(&old.instrument);
            }
        }
        if let Some(tags) = &tags {
            self.index.index(tags, &instrument);
        }
        replaced
    }

    /// Restore index entries for an instance still stored under other
    /// tag-set keys after one of its keys was replaced.
    fn reindex_survivors(&mut self, instrument: &Arc<dyn Instrument>) {
        let id = InstrumentId::of(instrument);
        let mut survivors: Vec<(&MetricKey, &TagSet)> = self
            .metrics
            .iter()
            .filter(|(_, e)| InstrumentId::of(&e.instrument) == id)
            .filter_map(|(k, e)| e.tags.as_ref().map(|t| (k, t)))
            .collect();
        if survivors.is_empty() {
            return;
        }
        survivors.sort_by(|a, b| a.0.cmp(b.0));
        let survivors: Vec<TagSet> = survivors.into_iter().map(|(_, t)| t.clone()).collect();
        for tags in &survivors {
            self.index.index(tags, instrument);
        }
    }
}

/// One row of [`Registry::catalog`].
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub key: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagSet>,
}

/// Instrument registry:
/// - `key -> instrument`
/// - `(tag, value) -> [instrument...]`
/// - `instrument -> tag-set`
///
/// All three live behind one reentrant lock. Factories and stop hooks run
/// with the lock held but without a borrow of the state, so they may call
/// back into the registry from the same thread.
pub struct Registry {
    state: ReentrantMutex<RefCell<RegistryState>>,
    defaults: RegistryDefaults,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_defaults(RegistryDefaults::default())
    }

    pub fn with_defaults(defaults: RegistryDefaults) -> Self {
        Self {
            state: ReentrantMutex::new(RefCell::new(RegistryState::default())),
            defaults,
        }
    }

    pub fn defaults(&self) -> RegistryDefaults {
        self.defaults
    }

    /// Look up an instrument. Fails with `NotFound` if absent.
    pub fn get(&self, name: impl Into<MetricName>) -> Result<Arc<dyn Instrument>> {
        let key = name.into().key();
        let guard = self.state.lock();
        let found = guard.borrow().metrics.get(&key).map(|e| Arc::clone(&e.instrument));
        found.ok_or_else(|| MetrologyError::NotFound { key: key.to_string() })
    }

    /// Typed lookup. Fails with `TypeMismatch` if the stored instrument is
    /// of another type.
    pub fn get_as<T: Instrument>(&self, name: impl Into<MetricName>) -> Result<Arc<T>> {
        let name = name.into();
        let key = name.key();
        let existing = self.get(name)?;
        expect_type::<T>(&key, existing)
    }

    pub fn contains(&self, name: impl Into<MetricName>) -> bool {
        let key = name.into().key();
        let guard = self.state.lock();
        let found = guard.borrow().metrics.contains_key(&key);
        found
    }

    /// Register unconditionally. Fails with `DuplicateRegistration` if the
    /// key is already occupied; the stored instrument is left untouched.
    pub fn add<T: Instrument>(&self, name: impl Into<MetricName>, instrument: Arc<T>) -> Result<()> {
        let name = name.into();
        let key = name.key();
        let kind = instrument.kind();
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();

        if state.metrics.contains_key(&key) {
            tracing::warn!(key = %key, "duplicate registration rejected");
            return Err(MetrologyError::DuplicateRegistration { key: key.to_string() });
        }

        tracing::debug!(key = %key, kind, "instrument added");
        state.insert(key, &name, instrument);
        Ok(())
    }

    /// Return the instrument stored under `name`, creating a `T::default()`
    /// if the key is free.
    pub fn get_or_create<T: Instrument + Default>(&self, name: impl Into<MetricName>) -> Result<Arc<T>> {
        self.get_or_create_with(name, T::default)
    }

    /// Return the instrument stored under `name`, or store and return the
    /// result of `factory`. Exactly one factory call wins per key; an
    /// occupied key of another type fails with `TypeMismatch`.
    pub fn get_or_create_with<T, F>(&self, name: impl Into<MetricName>, factory: F) -> Result<Arc<T>>
    where
        T: Instrument,
        F: FnOnce() -> T,
    {
        let name = name.into();
        let key = name.key();
        let guard = self.state.lock();

        let existing = guard.borrow().metrics.get(&key).map(|e| Arc::clone(&e.instrument));
        if let Some(existing) = existing {
            return expect_type::<T>(&key, existing);
        }

        let created = Arc::new(factory());

        // A re-entrant call from the factory may have taken the key.
        let raced = guard.borrow().metrics.get(&key).map(|e| Arc::clone(&e.instrument));
        if let Some(existing) = raced {
            return expect_type::<T>(&key, existing);
        }

        let kind = created.kind();
        tracing::debug!(key = %key, kind, "instrument created");
        let replaced = guard.borrow_mut().insert(key, &name, Arc::clone(&created) as Arc<dyn Instrument>);
        drop(replaced);
        Ok(created)
    }

    /// Store `instrument` under `name`, replacing whatever was there and
    /// re-indexing its tags.
    pub fn install<T: Instrument>(&self, name: impl Into<MetricName>, instrument: Arc<T>) -> Arc<T> {
        let name = name.into();
        let key = name.key();
        let kind = instrument.kind();
        let guard = self.state.lock();

        tracing::debug!(key = %key, kind, "instrument installed");
        let replaced = guard
            .borrow_mut()
            .insert(key, &name, Arc::clone(&instrument) as Arc<dyn Instrument>);
        // Released after the borrow ends; its drop may re-enter.
        drop(replaced);
        instrument
    }

    /// Instruments whose tag-set contains every `(tag, value)` in `filters`,
    /// each with its remaining tags. An empty filter yields nothing.
    pub fn filter(&self, filters: &TagSet) -> Filtered {
        let guard = self.state.lock();
        let matches = guard.borrow().index.matching(filters);
        Filtered { inner: matches.into_iter() }
    }

    /// Tag-set an instrument was registered under, if any.
    pub fn tags_of(&self, instrument: &Arc<dyn Instrument>) -> Option<TagSet> {
        let guard = self.state.lock();
        let tags = guard.borrow().index.tags_of(instrument).cloned();
        tags
    }

    /// Stop every stoppable instrument (once per instance) and empty the
    /// registry. The registry can be reused afterwards.
    pub fn clear(&self) {
        let guard = self.state.lock();
        let old = std::mem::take(&mut *guard.borrow_mut());

        let mut seen = HashSet::new();
        let mut stopped = 0usize;
        for entry in old.metrics.values() {
            if !seen.insert(InstrumentId::of(&entry.instrument)) {
                continue;
            }
            if let Some(s) = entry.instrument.as_stoppable() {
                s.stop();
                stopped += 1;
            }
        }
        tracing::debug!(removed = old.metrics.len(), stopped, "registry cleared");
        drop(old);
    }

    pub fn stop(&self) {
        self.clear();
    }

    /// Snapshot of `(key, instrument)` pairs, sorted by key.
    pub fn iter(&self) -> Snapshot {
        let guard = self.state.lock();
        let mut items: Vec<(MetricKey, Arc<dyn Instrument>)> = guard
            .borrow()
            .metrics
            .iter()
            .map(|(k, e)| (k.clone(), Arc::clone(&e.instrument)))
            .collect();
        items.sort_by(|a, b| a.0.cmp(&b.0));
        Snapshot { inner: items.into_iter() }
    }

    pub fn keys(&self) -> Vec<MetricKey> {
        self.iter().map(|(k, _)| k).collect()
    }

    pub fn len(&self) -> usize {
        let guard = self.state.lock();
        let n = guard.borrow().metrics.len();
        n
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Listing of registered instruments (identity only, no values).
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        let guard = self.state.lock();
        let mut rows: Vec<(MetricKey, Arc<dyn Instrument>, Option<TagSet>)> = guard
            .borrow()
            .metrics
            .iter()
            .map(|(k, e)| (k.clone(), Arc::clone(&e.instrument), e.tags.clone()))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        // kind() runs after the borrow ends; it may re-enter.
        rows.into_iter()
            .map(|(key, instrument, tags)| CatalogEntry {
                key: key.to_string(),
                kind: instrument.kind(),
                tags,
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = (MetricKey, Arc<dyn Instrument>);
    type IntoIter = Snapshot;

    fn into_iter(self) -> Snapshot {
        self.iter()
    }
}

fn expect_type<T: Instrument>(key: &MetricKey, existing: Arc<dyn Instrument>) -> Result<Arc<T>> {
    let found = (*existing).instrument_type();
    downcast_arc::<T>(existing).ok_or_else(|| {
        let expected = std::any::type_name::<T>();
        tracing::warn!(key = %key, expected, found, "instrument type mismatch");
        MetrologyError::TypeMismatch {
            key: key.to_string(),
            expected,
            found,
        }
    })
}

/// Result of [`Registry::filter`].
pub struct Filtered {
    inner: std::vec::IntoIter<(Arc<dyn Instrument>, TagSet)>,
}

impl Iterator for Filtered {
    type Item = (Arc<dyn Instrument>, TagSet);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Filtered {}

/// Result of [`Registry::iter`].
pub struct Snapshot {
    inner: std::vec::IntoIter<(MetricKey, Arc<dyn Instrument>)>,
}

impl Iterator for Snapshot {
    type Item = (MetricKey, Arc<dyn Instrument>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Snapshot {}
