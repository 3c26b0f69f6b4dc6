use crate::crawler::SortStrategy;
use crate::policy::PolicyFlags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Tidemark
///
/// Every section is optional in the TOML file; missing keys take the defaults
/// below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub incremental: IncrementalConfig,
    pub output: OutputConfig,
    pub http: HttpConfig,
    pub content: ContentConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Root locator of the site; discovered documents must live under it
    pub base_url: String,

    /// Path (relative to the base URL) of the page that lists the documents
    pub listing_path: String,

    /// Path fragment that marks a link as a document
    pub document_marker: String,

    /// Maximum number of documents processed per run
    pub max_documents: usize,

    /// Ordering applied before truncating to `max_documents`
    pub sort_method: SortStrategy,

    /// Minimum pause between two documents (milliseconds)
    pub request_delay_ms: u64,

    /// Per-fetch timeout (milliseconds)
    pub timeout_ms: u64,

    /// Run without a visible browsing session
    pub headless: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://support.optisigns.com".to_string(),
            listing_path: "/hc/en-us/articles".to_string(),
            document_marker: "/articles/".to_string(),
            max_documents: 30,
            sort_method: SortStrategy::Alphabetical,
            request_delay_ms: 2000,
            timeout_ms: 60_000,
            headless: true,
        }
    }
}

/// Incremental update configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IncrementalConfig {
    /// Skip documents whose content is unchanged since the last run
    pub enabled: bool,

    /// Reprocess every selected document regardless of the ledger
    pub force_all: bool,

    /// Ledger file name; relative paths live inside the output directory
    pub ledger_file: String,
}

impl Default for IncrementalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            force_all: false,
            ledger_file: "processed_articles.json".to_string(),
        }
    }
}

/// Output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory receiving the rendered Markdown documents
    pub output_dir: String,

    /// Directory receiving run reports
    pub artifacts_dir: String,

    /// Directory receiving per-run log files
    pub logs_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: "scrape_output".to_string(),
            artifacts_dir: "artifacts".to_string(),
            logs_dir: "logs".to_string(),
        }
    }
}

/// HTTP request configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Headers sent with every request
    pub headers: BTreeMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(
            "User-Agent".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36"
                .to_string(),
        );
        headers.insert(
            "Accept-Language".to_string(),
            "en-US,en;q=0.9".to_string(),
        );
        Self { headers }
    }
}

/// Content extraction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ContentConfig {
    /// Site suffix stripped from page titles (e.g. " - OptiSigns")
    pub title_suffix: String,

    /// Selectors tried in order to find the navigation sidebar
    pub sidebar_selectors: Vec<String>,

    /// Elements removed from the document body before conversion
    pub unwanted_selectors: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        let to_strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            title_suffix: " - OptiSigns".to_string(),
            sidebar_selectors: to_strings(&[
                ".knowledge-tree",
                "nav.sidebar",
                ".sidebar",
                ".navigation-sidebar",
                ".side-nav",
                ".article-list",
                "[class*=\"sidebar\"]",
                "[class*=\"navigation\"]",
            ]),
            unwanted_selectors: to_strings(&[
                ".article-votes",
                ".article-meta",
                ".comments",
                ".share-buttons",
                "nav",
                "footer",
                "aside",
                ".related-articles",
                ".breadcrumbs",
            ]),
        }
    }
}

impl Config {
    /// Location of the ledger file
    pub fn ledger_path(&self) -> PathBuf {
        let ledger = PathBuf::from(&self.incremental.ledger_file);
        if ledger.is_absolute() {
            ledger
        } else {
            PathBuf::from(&self.output.output_dir).join(ledger)
        }
    }

    /// Full URL of the listing page
    pub fn listing_url(&self) -> String {
        format!("{}{}", self.crawler.base_url, self.crawler.listing_path)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.crawler.request_delay_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.crawler.timeout_ms)
    }

    pub fn policy_flags(&self) -> PolicyFlags {
        PolicyFlags {
            force_all: self.incremental.force_all,
            incremental: self.incremental.enabled,
        }
    }
}
