use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use metrology_core::{Instrument, InstrumentId, TagSet};

type TagPair = (String, String);

/// Tag index:
/// - `(tag, value) -> [instrument...]` in registration order
/// - `instrument -> original tag-set`
#[derive(Default)]
pub(crate) struct TagIndex {
    metrics_by_tag: HashMap<TagPair, Vec<Arc<dyn Instrument>>>,
    tags_by_metric: HashMap<InstrumentId, TagSet>,
}

impl TagIndex {
    pub fn index(&mut self, tags: &TagSet, instrument: &Arc<dyn Instrument>) {
        let id = InstrumentId::of(instrument);
        for (k, v) in tags.iter() {
            let list = self
                .metrics_by_tag
                .entry((k.to_string(), v.to_string()))
                .or_default();
            if !list.iter().any(|m| InstrumentId::of(m) == id) {
                list.push(Arc::clone(instrument));
            }
        }
        // Last writer wins when one instance carries several tag-sets.
        self.tags_by_metric.insert(id, tags.clone());
    }

    pub fn unindex(&mut self, tags: &TagSet, instrument: &Arc<dyn Instrument>) {
        let id = InstrumentId::of(instrument);

        let retained = match self.tags_by_metric.get(&id) {
            Some(current) if current == tags => {
                self.tags_by_metric.remove(&id);
                None
            }
            other => other.cloned(),
        };

        for (k, v) in tags.iter() {
            // still reachable through the tag-set recorded for this instance
            if retained.as_ref().and_then(|t| t.get(k)) == Some(v) {
                continue;
            }
            let pair = (k.to_string(), v.to_string());
            if let Some(list) = self.metrics_by_tag.get_mut(&pair) {
                list.retain(|m| InstrumentId::of(m) != id);
                if list.is_empty() {
                    self.metrics_by_tag.remove(&pair);
                }
            }
        }
    }

    /// Instruments carrying every `(tag, value)` pair in `filters`, each
    /// paired with its tags minus the filtered tag names.
    /// An empty filter matches nothing.
    pub fn matching(&self, filters: &TagSet) -> Vec<(Arc<dyn Instrument>, TagSet)> {
        let mut pairs = filters.iter();
        let Some((k0, v0)) = pairs.next() else { return vec![]; };
        let Some(first) = self.candidates(k0, v0) else { return vec![]; };

        let mut survivors: HashSet<InstrumentId> = first.iter().map(InstrumentId::of).collect();
        for (k, v) in pairs {
            let Some(local) = self.candidates(k, v) else { return vec![]; };
            let local: HashSet<InstrumentId> = local.iter().map(InstrumentId::of).collect();
            survivors.retain(|id| local.contains(id));
            if survivors.is_empty() {
                return vec![];
            }
        }

        // keep registration order of the first pair's list
        first
            .iter()
            .filter(|m| survivors.contains(&InstrumentId::of(m)))
            .filter_map(|m| {
                let tags = self.tags_by_metric.get(&InstrumentId::of(m))?;
                Some((Arc::clone(m), tags.without(filters)))
            })
            .collect()
    }

    pub fn tags_of(&self, instrument: &Arc<dyn Instrument>) -> Option<&TagSet> {
        self.tags_by_metric.get(&InstrumentId::of(instrument))
    }

    fn candidates(&self, tag: &str, value: &str) -> Option<&Vec<Arc<dyn Instrument>>> {
        self.metrics_by_tag.get(&(tag.to_string(), value.to_string()))
    }
}
