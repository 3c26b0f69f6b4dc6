//! Discovery bookkeeping and run selection
//!
//! Discovery accumulates identities into a [`DiscoveredSet`], which
//! deduplicates while remembering the order identities were first seen. The
//! harvester then orders that set with a [`SortStrategy`] and truncates it to
//! the configured maximum, producing the [`RunSelection`] for this run.

use crate::url::DocumentId;
use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// How discovered identities are ordered before truncation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortStrategy {
    /// Ascending lexicographic order of the identity string
    #[default]
    Alphabetical,
    /// Descending lexicographic order of the identity string
    Reverse,
    /// The order in which discovery first yielded each identity
    DiscoveryOrder,
}

impl SortStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alphabetical => "alphabetical",
            Self::Reverse => "reverse",
            Self::DiscoveryOrder => "discovery_order",
        }
    }

    /// Human-readable description for log lines
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Alphabetical => "sorted alphabetically",
            Self::Reverse => "sorted reverse alphabetically",
            Self::DiscoveryOrder => "in discovery order",
        }
    }
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "alphabetical" => Ok(Self::Alphabetical),
            "reverse" => Ok(Self::Reverse),
            "discovery_order" => Ok(Self::DiscoveryOrder),
            _ => Err(ConfigError::UnknownSortMethod(s.to_string())),
        }
    }
}

/// Deduplicated identities in first-seen order
#[derive(Debug, Clone, Default)]
pub struct DiscoveredSet {
    order: Vec<DocumentId>,
    seen: HashSet<DocumentId>,
}

impl DiscoveredSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an identity; returns false if it was already present
    pub fn insert(&mut self, id: DocumentId) -> bool {
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.insert(id.clone());
        self.order.push(id);
        true
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Identities in discovery order
    pub fn as_slice(&self) -> &[DocumentId] {
        &self.order
    }

    pub fn into_vec(self) -> Vec<DocumentId> {
        self.order
    }
}

impl FromIterator<DocumentId> for DiscoveredSet {
    fn from_iter<I: IntoIterator<Item = DocumentId>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl Extend<DocumentId> for DiscoveredSet {
    fn extend<I: IntoIterator<Item = DocumentId>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

/// The ordered, bounded list of identities processed in one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSelection {
    items: Vec<DocumentId>,
}

impl RunSelection {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DocumentId> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[DocumentId] {
        &self.items
    }
}

impl<'a> IntoIterator for &'a RunSelection {
    type Item = &'a DocumentId;
    type IntoIter = std::slice::Iter<'a, DocumentId>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Orders the discovered identities and keeps the first `max`
///
/// Deterministic: the same set, strategy and bound always give the same
/// selection.
pub fn select(discovered: &DiscoveredSet, strategy: SortStrategy, max: usize) -> RunSelection {
    let mut items = discovered.as_slice().to_vec();

    match strategy {
        SortStrategy::Alphabetical => items.sort(),
        SortStrategy::Reverse => items.sort_by(|a, b| b.cmp(a)),
        SortStrategy::DiscoveryOrder => {}
    }

    items.truncate(max);
    RunSelection { items }
}
