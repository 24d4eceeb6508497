//! Registry keys: plain names and tag-sets.
//!
//! A tag-set is unordered, so before it can identify an instrument it is
//! normalized into a sequence of `(tag, value)` pairs sorted by tag name.
//! Two tag-sets carrying the same pairs always normalize to the same key,
//! whatever order they were built in.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Unordered tag-name -> tag-value collection attached to an instrument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TagSet {
    tags: BTreeMap<String, String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag. An existing tag name is overwritten.
    pub fn insert(&mut self, tag: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.tags.insert(tag.into(), value.into());
        self
    }

    /// Builder form of [`TagSet::insert`].
    pub fn with(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(tag, value);
        self
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.tags.get(tag).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy of this tag-set without the tag names present in `other`.
    pub fn without(&self, other: &TagSet) -> TagSet {
        self.tags
            .iter()
            .filter(|(k, _)| !other.tags.contains_key(*k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Canonical `(tag, value)` pairs, sorted by tag name.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.tags.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

impl<const N: usize> From<[(&str, &str); N]> for TagSet {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str("}")
    }
}

/// Caller-facing instrument name: a plain name or a tag-set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricName {
    Name(String),
    Tags(TagSet),
}

impl MetricName {
    /// Tag-set carried by this name, if any.
    pub fn tags(&self) -> Option<&TagSet> {
        match self {
            MetricName::Name(_) => None,
            MetricName::Tags(t) => Some(t),
        }
    }

    /// Normalized key used for storage.
    pub fn key(&self) -> MetricKey {
        MetricKey::normalize(self)
    }
}

impl From<&str> for MetricName {
    fn from(s: &str) -> Self {
        MetricName::Name(s.to_string())
    }
}

impl From<String> for MetricName {
    fn from(s: String) -> Self {
        MetricName::Name(s)
    }
}

impl From<&String> for MetricName {
    fn from(s: &String) -> Self {
        MetricName::Name(s.clone())
    }
}

impl From<TagSet> for MetricName {
    fn from(t: TagSet) -> Self {
        MetricName::Tags(t)
    }
}

impl From<&TagSet> for MetricName {
    fn from(t: &TagSet) -> Self {
        MetricName::Tags(t.clone())
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricName::Name(n) => f.write_str(n),
            MetricName::Tags(t) => t.fmt(f),
        }
    }
}

/// Normalized, hashable storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKey {
    Name(String),
    Tags(Vec<(String, String)>),
}

impl MetricKey {
    pub fn normalize(name: &MetricName) -> Self {
        match name {
            MetricName::Name(n) => MetricKey::Name(n.clone()),
            MetricName::Tags(t) => MetricKey::Tags(t.to_pairs()),
        }
    }

    pub fn is_tagged(&self) -> bool {
        matches!(self, MetricKey::Tags(_))
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKey::Name(n) => f.write_str(n),
            MetricKey::Tags(pairs) => {
                f.write_str("{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                f.write_str("}")
            }
        }
    }
}
