//! Crawler module for document discovery and harvesting
//!
//! This module contains the core harvesting logic, including:
//! - Collaborator traits for discovery, fetching and rendering
//! - HTTP fetching and listing page parsing
//! - Selection of the documents processed in a run
//! - Overall harvest orchestration and the run lock

mod discovery;
mod fetcher;
mod harvester;
mod lock;
mod parser;
mod selection;
mod traits;

pub use discovery::SidebarDiscoverer;
pub use fetcher::{build_http_client, fetch_url, HttpFetcher};
pub use harvester::Harvester;
pub use lock::{RunLock, LOCK_FILE_NAME};
pub use parser::{extract_sidebar_links, extract_title, resolve_link, SidebarLinks};
pub use selection::{select, DiscoveredSet, RunSelection, SortStrategy};
pub use traits::{
    Discoverer, DiscoveryError, FetchError, Fetcher, Materialized, RawContent, RenderError,
    Renderer,
};

pub(crate) use parser::title_of;

use crate::config::Config;
use crate::render::MarkdownRenderer;

/// Harvester wired to the live site: sidebar discovery and HTTP fetching
/// over one shared session, Markdown output
pub type SiteHarvester = Harvester<SidebarDiscoverer<HttpFetcher>, HttpFetcher, MarkdownRenderer>;

/// Builds the harvester for a live run
///
/// This is the main entry point for the binary. The discoverer and the
/// fetcher share one HTTP session (connection pool, default headers).
///
/// # Arguments
///
/// * `config` - The validated configuration
///
/// # Returns
///
/// * `Ok(SiteHarvester)` - Ready to [`run`](Harvester::run)
/// * `Err(HarvestError::Reqwest)` - The HTTP client could not be built
pub fn build_site_harvester(config: Config) -> crate::Result<SiteHarvester> {
    if !config.crawler.headless {
        tracing::debug!("Visible mode requested; HTTP sessions have no window to show");
    }

    let fetcher = HttpFetcher::from_config(&config)?;
    let discoverer = SidebarDiscoverer::new(fetcher.clone(), &config);
    let renderer = MarkdownRenderer::new(&config);

    Ok(Harvester::new(config, discoverer, fetcher, renderer))
}
