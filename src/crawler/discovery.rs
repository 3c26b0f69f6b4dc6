//! Document discovery from the site's listing page
//!
//! The listing page carries a navigation sidebar that links every published
//! document. [`SidebarDiscoverer`] fetches that page, reads the sidebar (or the
//! whole page when no sidebar is recognized) and keeps the links that live
//! under the site root and look like documents.

use crate::config::Config;
use crate::crawler::parser::extract_sidebar_links;
use crate::crawler::selection::DiscoveredSet;
use crate::crawler::traits::{DiscoveryError, Discoverer, Fetcher};
use crate::url::{is_document_url, normalize_url, within_root, DocumentId};
use async_trait::async_trait;
use url::Url;

/// Discovers documents through the listing page sidebar
pub struct SidebarDiscoverer<F> {
    fetcher: F,
    listing_url: String,
    document_marker: String,
    sidebar_selectors: Vec<String>,
}

impl<F: Fetcher> SidebarDiscoverer<F> {
    pub fn new(fetcher: F, config: &Config) -> Self {
        Self {
            fetcher,
            listing_url: config.listing_url(),
            document_marker: config.crawler.document_marker.clone(),
            sidebar_selectors: config.content.sidebar_selectors.clone(),
        }
    }
}

#[async_trait]
impl<F: Fetcher> Discoverer for SidebarDiscoverer<F> {
    async fn discover(&mut self, root: &Url) -> Result<Vec<DocumentId>, DiscoveryError> {
        let listing = DocumentId::parse(&self.listing_url).map_err(|e| DiscoveryError::InvalidUrl {
            url: self.listing_url.clone(),
            message: e.to_string(),
        })?;

        tracing::info!("Loading listing page {}", listing);
        let content = self
            .fetcher
            .fetch(&listing)
            .await
            .map_err(|source| DiscoveryError::Fetch {
                url: listing.to_string(),
                source,
            })?;

        // Relative links resolve against wherever the listing was served from
        let base = match Url::parse(&content.final_url) {
            Ok(url) => url,
            Err(_) => listing.to_url().map_err(|e| DiscoveryError::InvalidUrl {
                url: content.final_url.clone(),
                message: e.to_string(),
            })?,
        };

        let found = extract_sidebar_links(&content.body, &base, &self.sidebar_selectors);
        match &found.matched_selector {
            Some(selector) => tracing::info!("Found sidebar with selector {}", selector),
            None => tracing::warn!("No sidebar found, falling back to all links on the page"),
        }

        let mut documents = DiscoveredSet::new();
        for link in found.links {
            let normalized = match normalize_url(link.as_str()) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Skipping link {}: {}", link, e);
                    continue;
                }
            };

            if within_root(&normalized, root) && is_document_url(&normalized, &self.document_marker)
            {
                documents.insert(DocumentId::from_normalized(normalized));
            }
        }

        tracing::info!("Found {} document links on the listing page", documents.len());
        Ok(documents.into_vec())
    }
}
