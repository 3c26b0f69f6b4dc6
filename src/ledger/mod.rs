//! Processing ledger
//!
//! The ledger maps each [`DocumentId`] to what was last materialized for it:
//! the output file name, the content fingerprint, when it happened, and where
//! the artifact lives. It is loaded once per run, mutated in memory by the
//! harvester, and written back at the end of the run.
//!
//! On disk the ledger is a pretty-printed JSON object keyed by identity:
//!
//! ```json
//! {
//!   "https://support.example.com/hc/en-us/articles/1-Intro": {
//!     "filename": "intro.md",
//!     "content_hash": "9f86d0…",
//!     "last_processed": "2024-05-01 09:30:00",
//!     "file_path": "scrape_output/intro.md"
//!   }
//! }
//! ```

mod store;

pub use store::{LedgerStore, LoadStatus};

use crate::fingerprint::ContentFingerprint;
use crate::url::DocumentId;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use thiserror::Error;

/// Timestamp format used for `last_processed`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can occur while loading or persisting the ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Ledger file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        source: serde_json::Error,
    },

    #[error("Failed to serialize ledger: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write ledger to {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// What the ledger remembers about one materialized document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Output file name (e.g. `getting-started.md`)
    #[serde(rename = "filename")]
    pub output_name: String,

    /// Fingerprint of the raw content that was materialized
    #[serde(rename = "content_hash")]
    pub fingerprint: ContentFingerprint,

    /// Local time of the materialization, formatted with [`TIMESTAMP_FORMAT`]
    pub last_processed: String,

    /// Where the artifact was written
    #[serde(rename = "file_path")]
    pub output_location: String,
}

impl LedgerEntry {
    /// Creates an entry stamped with the current local time
    pub fn new(
        output_name: impl Into<String>,
        fingerprint: ContentFingerprint,
        output_location: impl Into<String>,
    ) -> Self {
        Self {
            output_name: output_name.into(),
            fingerprint,
            last_processed: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            output_location: output_location.into(),
        }
    }
}

/// The full identity → entry mapping
///
/// Entries are only ever inserted or overwritten. Documents that disappear
/// from the site keep their entry as history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: BTreeMap<DocumentId, LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &DocumentId) -> Option<&LedgerEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.entries.contains_key(id)
    }

    /// Inserts or overwrites the entry for `id`, returning the previous one
    pub fn put(&mut self, id: DocumentId, entry: LedgerEntry) -> Option<LedgerEntry> {
        self.entries.insert(id, entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in identity order
    pub fn iter(&self) -> btree_map::Iter<'_, DocumentId, LedgerEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = (&'a DocumentId, &'a LedgerEntry);
    type IntoIter = btree_map::Iter<'a, DocumentId, LedgerEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint;

    fn id(s: &str) -> DocumentId {
        DocumentId::parse(s).unwrap()
    }

    #[test]
    fn test_put_overwrites() {
        let mut ledger = Ledger::new();
        let doc = id("https://example.com/articles/1");

        let first = LedgerEntry::new("a.md", fingerprint("v1"), "out/a.md");
        assert!(ledger.put(doc.clone(), first.clone()).is_none());

        let second = LedgerEntry::new("a-renamed.md", fingerprint("v2"), "out/a-renamed.md");
        let previous = ledger.put(doc.clone(), second.clone());

        assert_eq!(previous, Some(first));
        assert_eq!(ledger.get(&doc), Some(&second));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let ledger = Ledger::new();
        assert!(ledger.get(&id("https://example.com/articles/x")).is_none());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_entry_field_names_on_disk() {
        let entry = LedgerEntry {
            output_name: "intro.md".to_string(),
            fingerprint: ContentFingerprint::from_hex("abc123"),
            last_processed: "2024-05-01 09:30:00".to_string(),
            output_location: "out/intro.md".to_string(),
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["filename"], "intro.md");
        assert_eq!(value["content_hash"], "abc123");
        assert_eq!(value["last_processed"], "2024-05-01 09:30:00");
        assert_eq!(value["file_path"], "out/intro.md");
    }

    #[test]
    fn test_entry_timestamp_format() {
        let entry = LedgerEntry::new("a.md", fingerprint("x"), "a.md");
        assert!(chrono::NaiveDateTime::parse_from_str(&entry.last_processed, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_iteration_is_sorted() {
        let mut ledger = Ledger::new();
        for url in [
            "https://example.com/articles/c",
            "https://example.com/articles/a",
            "https://example.com/articles/b",
        ] {
            ledger.put(id(url), LedgerEntry::new("x.md", fingerprint(url), "x.md"));
        }

        let keys: Vec<&str> = ledger.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "https://example.com/articles/a",
                "https://example.com/articles/b",
                "https://example.com/articles/c",
            ]
        );
    }
}
