//! URL handling module for Tidemark
//!
//! This module provides the canonical [`DocumentId`] used as the ledger key,
//! URL normalization, and the predicates that decide whether a link is a
//! harvestable document of the target site.

mod normalize;

use crate::UrlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

pub use normalize::normalize_url;

/// Canonical locator of one document
///
/// A `DocumentId` can only be built from a normalized URL, so two spellings of
/// the same document always map to the same ledger key.
///
/// Deserialization goes through [`DocumentId::parse`] too, so a ledger written
/// with an older or hand-edited spelling still lines up with discovery.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Normalizes `raw` and wraps it as a document identity
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        normalize_url(raw).map(Self::from_normalized)
    }

    /// Wraps a URL that already went through [`normalize_url`]
    pub(crate) fn from_normalized(url: Url) -> Self {
        Self(url.into())
    }

    /// Returns the identity as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the identity as a parsed URL
    pub fn to_url(&self) -> Result<Url, UrlError> {
        Url::parse(&self.0).map_err(|e| UrlError::Parse(e.to_string()))
    }
}

impl TryFrom<String> for DocumentId {
    type Error = UrlError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns true if `url` lives under `root`: same origin, and a path that
/// starts with the root's path
///
/// # Examples
///
/// ```
/// use tidemark::url::{normalize_url, within_root};
///
/// let root = normalize_url("https://support.example.com").unwrap();
/// let inside = normalize_url("https://support.example.com/hc/articles/1").unwrap();
/// let outside = normalize_url("https://example.com/hc/articles/1").unwrap();
/// assert!(within_root(&inside, &root));
/// assert!(!within_root(&outside, &root));
/// ```
pub fn within_root(url: &Url, root: &Url) -> bool {
    if url.origin() != root.origin() {
        return false;
    }

    let root_path = root.path().trim_end_matches('/');
    let path = url.path();
    path == root_path
        || root_path.is_empty()
        || path
            .strip_prefix(root_path)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Returns true if the URL's path carries the document marker
/// (for example `/articles/`)
pub fn is_document_url(url: &Url, marker: &str) -> bool {
    url.path().contains(marker)
}
