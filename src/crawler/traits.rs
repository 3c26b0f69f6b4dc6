//! Collaborator traits and error types
//!
//! The harvester drives three collaborators: a [`Discoverer`] that lists the
//! documents to consider, a [`Fetcher`] that retrieves raw content, and a
//! [`Renderer`] that turns raw content into an output artifact. The HTTP,
//! sidebar and Markdown implementations live alongside; tests substitute
//! in-memory ones.

use crate::url::DocumentId;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that make discovery (and therefore the run) fail
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to fetch listing page {url}: {source}")]
    Fetch { url: String, source: FetchError },

    #[error("Invalid listing URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("{0}")]
    Other(String),
}

/// Per-document fetch failures
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Per-document render failures
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No <body> element in document")]
    NoBody,

    #[error("Failed to convert HTML: {0}")]
    Convert(String),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Raw content of one fetched document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContent {
    /// URL the content was finally served from
    pub final_url: String,
    /// Response body as text
    pub body: String,
}

impl RawContent {
    pub fn new(final_url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            final_url: final_url.into(),
            body: body.into(),
        }
    }
}

/// Where a rendered document ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    /// Output file name (e.g. `getting-started.md`)
    pub output_name: String,
    /// Full output location
    pub output_location: String,
}

/// Lists the documents a run should consider
#[async_trait]
pub trait Discoverer: Send {
    /// Returns the document identities under `root`, in discovery order
    ///
    /// Implementations only yield identities that belong to the target site
    /// and look like documents. Duplicates are allowed; the harvester
    /// deduplicates.
    async fn discover(&mut self, root: &Url) -> Result<Vec<DocumentId>, DiscoveryError>;
}

/// Retrieves raw document content
///
/// `fetch` takes `&mut self`: a session serves one request at a time, so two
/// documents can never be in flight on the same session.
#[async_trait]
pub trait Fetcher: Send {
    async fn fetch(&mut self, id: &DocumentId) -> Result<RawContent, FetchError>;
}

/// Converts raw content into an output artifact
pub trait Renderer: Send {
    /// Renders and writes the document
    ///
    /// `index` is the document's position in the run selection; it feeds the
    /// fallback file name when no title can be derived.
    fn materialize(
        &mut self,
        content: &RawContent,
        id: &DocumentId,
        index: usize,
    ) -> Result<Materialized, RenderError>;
}
