//! Tidemark: an incremental document harvester
//!
//! This crate discovers the documents published under a site's listing page,
//! fetches each one, fingerprints its content, and only re-renders documents
//! whose content changed since the previous run. A JSON ledger records what was
//! materialized so that repeated runs skip unchanged documents.

pub mod config;
pub mod crawler;
pub mod fingerprint;
pub mod ledger;
pub mod policy;
pub mod render;
pub mod report;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Tidemark operations
///
/// Only errors that end a run are represented here. Per-document failures
/// ([`crawler::FetchError`], [`crawler::RenderError`]) are absorbed by the
/// harvester and never surface as a `HarvestError`.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Discovery failed: {0}")]
    Discovery(#[from] crawler::DiscoveryError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Another run holds the lock at {}", path.display())]
    Locked { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid HTTP header: {0}")]
    InvalidHeader(String),

    #[error("Unknown sort method: {0} (expected alphabetical, reverse or discovery_order)")]
    UnknownSortMethod(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Tidemark operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Harvester, SortStrategy};
pub use fingerprint::{fingerprint, ContentFingerprint};
pub use ledger::{Ledger, LedgerEntry, LedgerStore};
pub use policy::{decide, ChangeReason, Decision, PolicyFlags};
pub use report::{RunOutcome, RunTally};
pub use url::{normalize_url, DocumentId};
