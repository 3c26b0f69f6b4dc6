//! HTML parser for extracting document links and titles
//!
//! This module handles parsing HTML content to extract:
//! - Links from the navigation sidebar of the listing page
//! - The page title

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Links found on a listing page
#[derive(Debug, Clone, Default)]
pub struct SidebarLinks {
    /// Sidebar selector that matched, or `None` when the whole page was used
    pub matched_selector: Option<String>,

    /// Absolute URLs in document order (duplicates possible)
    pub links: Vec<Url>,
}

/// Extracts links from the first sidebar that matches
///
/// Each selector in `sidebar_selectors` is tried in order; links are taken
/// from the first element that matches. When none matches, every `a[href]`
/// on the page is used instead.
///
/// # Link Rules
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only links
/// - Anything that is not HTTP(S) after resolution
///
/// # Example
///
/// ```
/// use tidemark::crawler::extract_sidebar_links;
/// use url::Url;
///
/// let html = r#"<div class="knowledge-tree"><a href="/hc/articles/1">One</a></div>"#;
/// let base = Url::parse("https://example.com/hc").unwrap();
/// let found = extract_sidebar_links(html, &base, &[".knowledge-tree".to_string()]);
/// assert_eq!(found.matched_selector.as_deref(), Some(".knowledge-tree"));
/// assert_eq!(found.links[0].as_str(), "https://example.com/hc/articles/1");
/// ```
pub fn extract_sidebar_links(html: &str, base_url: &Url, sidebar_selectors: &[String]) -> SidebarLinks {
    let document = Html::parse_document(html);

    for raw in sidebar_selectors {
        let selector = match Selector::parse(raw) {
            Ok(s) => s,
            Err(_) => {
                tracing::debug!("Skipping unparsable sidebar selector {}", raw);
                continue;
            }
        };

        if let Some(sidebar) = document.select(&selector).next() {
            return SidebarLinks {
                matched_selector: Some(raw.clone()),
                links: links_under(sidebar, base_url),
            };
        }
    }

    SidebarLinks {
        matched_selector: None,
        links: links_under(document.root_element(), base_url),
    }
}

/// Collects resolvable links under an element
fn links_under(element: ElementRef<'_>, base_url: &Url) -> Vec<Url> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    element
        .select(&a_selector)
        .filter(|a| a.value().attr("download").is_none())
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Extracts the page title from HTML
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    title_of(&document)
}

/// Extracts the page title from a parsed document
///
/// A present but blank `<title>` yields `Some("")`; only a missing element
/// yields `None`.
pub(crate) fn title_of(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/hc/en-us/articles").unwrap()
    }

    fn selectors() -> Vec<String> {
        vec![".knowledge-tree".to_string(), "nav.sidebar".to_string()]
    }

    fn link_strings(found: &SidebarLinks) -> Vec<&str> {
        found.links.iter().map(|u| u.as_str()).collect()
    }

    #[test]
    fn test_extract_title() {
        let html = r#"<html><head><title>  Test Page  </title></head><body></body></html>"#;
        assert_eq!(extract_title(html), Some("Test Page".to_string()));
    }

    #[test]
    fn test_no_title() {
        assert_eq!(extract_title("<html><head></head><body></body></html>"), None);
    }

    #[test]
    fn test_blank_title_is_empty_not_missing() {
        assert_eq!(
            extract_title("<html><head><title>  </title></head></html>"),
            Some(String::new())
        );
    }

    #[test]
    fn test_sidebar_links_only() {
        let html = r#"
            <html><body>
              <a href="/hc/en-us/articles/99-Outside">Outside</a>
              <div class="knowledge-tree">
                <a href="/hc/en-us/articles/1-One">One</a>
                <a href="https://example.com/hc/en-us/articles/2-Two">Two</a>
              </div>
            </body></html>
        "#;

        let found = extract_sidebar_links(html, &base_url(), &selectors());
        assert_eq!(found.matched_selector.as_deref(), Some(".knowledge-tree"));
        assert_eq!(
            link_strings(&found),
            vec![
                "https://example.com/hc/en-us/articles/1-One",
                "https://example.com/hc/en-us/articles/2-Two",
            ]
        );
    }

    #[test]
    fn test_first_matching_selector_wins() {
        let html = r#"
            <nav class="sidebar"><a href="/b">B</a></nav>
            <div class="knowledge-tree"><a href="/a">A</a></div>
        "#;

        let found = extract_sidebar_links(html, &base_url(), &selectors());
        assert_eq!(found.matched_selector.as_deref(), Some(".knowledge-tree"));
        assert_eq!(link_strings(&found), vec!["https://example.com/a"]);
    }

    #[test]
    fn test_fallback_to_whole_page() {
        let html = r#"<html><body><a href="/x">X</a><p><a href="/y">Y</a></p></body></html>"#;
        let found = extract_sidebar_links(html, &base_url(), &selectors());

        assert!(found.matched_selector.is_none());
        assert_eq!(
            link_strings(&found),
            vec!["https://example.com/x", "https://example.com/y"]
        );
    }

    #[test]
    fn test_relative_path_link() {
        let html = r#"<div class="knowledge-tree"><a href="articles/3">Rel</a></div>"#;
        let found = extract_sidebar_links(html, &base_url(), &selectors());
        assert_eq!(link_strings(&found), vec!["https://example.com/hc/en-us/articles/3"]);
    }

    #[test]
    fn test_skip_special_links() {
        let html = r##"
            <div class="knowledge-tree">
              <a href="javascript:void(0)">JS</a>
              <a href="mailto:test@example.com">Mail</a>
              <a href="tel:+1234567890">Call</a>
              <a href="data:text/html,hi">Data</a>
              <a href="#section">Jump</a>
              <a href="/file.pdf" download>Download</a>
              <a href="ftp://example.com/f">FTP</a>
              <a href="/valid">Valid</a>
            </div>
        "##;

        let found = extract_sidebar_links(html, &base_url(), &selectors());
        assert_eq!(link_strings(&found), vec!["https://example.com/valid"]);
    }

    #[test]
    fn test_bad_selector_is_skipped() {
        let html = r#"<nav class="sidebar"><a href="/n">N</a></nav>"#;
        let selectors = vec!["div[[".to_string(), "nav.sidebar".to_string()];
        let found = extract_sidebar_links(html, &base_url(), &selectors);
        assert_eq!(found.matched_selector.as_deref(), Some("nav.sidebar"));
    }

    #[test]
    fn test_resolve_link() {
        let base = base_url();
        assert_eq!(
            resolve_link(" /a ", &base).map(|u| u.to_string()),
            Some("https://example.com/a".to_string())
        );
        assert!(resolve_link("", &base).is_none());
        assert!(resolve_link("JavaScript:alert(1)", &base).is_none());
    }
}
