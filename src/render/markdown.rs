//! Markdown renderer
//!
//! Converts a fetched document page into a Markdown file:
//! - Strips the configured unwanted elements (navigation, votes, comments...)
//! - Converts the remaining `<body>` to text with `html2text`
//! - Prefixes a small front matter block with the source URL and scrape time

use crate::config::Config;
use crate::crawler::title_of;
use crate::crawler::{Materialized, RawContent, RenderError, Renderer};
use crate::render::naming::{disambiguated_name, document_title, output_file_name};
use crate::url::DocumentId;
use scraper::{Html, Selector};
use std::fs;
use std::path::{Path, PathBuf};

/// Line width handed to `html2text`
const WRAP_WIDTH: usize = 200;

/// Writes each materialized document as `<output-dir>/<slug>.md`
pub struct MarkdownRenderer {
    output_dir: PathBuf,
    title_suffix: String,
    unwanted: Vec<Selector>,
}

impl MarkdownRenderer {
    pub fn new(config: &Config) -> Self {
        let unwanted = config
            .content
            .unwanted_selectors
            .iter()
            .filter_map(|raw| match Selector::parse(raw) {
                Ok(selector) => Some(selector),
                Err(_) => {
                    tracing::warn!("Ignoring unparsable unwanted selector {}", raw);
                    None
                }
            })
            .collect();

        Self {
            output_dir: PathBuf::from(&config.output.output_dir),
            title_suffix: config.content.title_suffix.clone(),
            unwanted,
        }
    }

    /// Converts a page to Markdown, returning its title and text
    pub fn convert(&self, html: &str, id: &DocumentId) -> Result<(String, String), RenderError> {
        let mut document = Html::parse_document(html);
        let title = document_title(title_of(&document).as_deref(), &self.title_suffix, id);

        for selector in &self.unwanted {
            let ids: Vec<_> = document.select(selector).map(|el| el.id()).collect();
            for node_id in ids {
                if let Some(mut node) = document.tree.get_mut(node_id) {
                    node.detach();
                }
            }
        }

        let body_selector =
            Selector::parse("body").map_err(|e| RenderError::Convert(format!("{:?}", e)))?;
        let body = document
            .select(&body_selector)
            .next()
            .ok_or(RenderError::NoBody)?
            .html();

        let text = html2text::from_read(body.as_bytes(), WRAP_WIDTH)
            .map_err(|e| RenderError::Convert(e.to_string()))?;

        Ok((title, text))
    }

    /// Keeps `name` unless the file already holds a different document
    fn claim_name(&self, name: String, id: &DocumentId) -> String {
        match front_matter_url(&self.output_dir.join(&name)) {
            Some(owner) if owner != id.as_str() => {
                let renamed = disambiguated_name(&name, id);
                tracing::warn!(
                    "{} already holds {}, writing {} as {}",
                    name,
                    owner,
                    id,
                    renamed
                );
                renamed
            }
            _ => name,
        }
    }
}

/// Source URL recorded in an existing output file
fn front_matter_url(path: &Path) -> Option<String> {
    let existing = fs::read_to_string(path).ok()?;
    let mut lines = existing.lines();
    if lines.next()? != "---" {
        return None;
    }
    lines
        .take_while(|line| *line != "---")
        .find_map(|line| line.strip_prefix("url: "))
        .map(|url| url.trim().to_string())
}

impl Renderer for MarkdownRenderer {
    fn materialize(
        &mut self,
        content: &RawContent,
        id: &DocumentId,
        index: usize,
    ) -> Result<Materialized, RenderError> {
        let (title, text) = self.convert(&content.body, id)?;
        let output_name = self.claim_name(output_file_name(&title, index, id), id);
        let path = self.output_dir.join(&output_name);

        let scraped = chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]");
        let markdown = format!("---\nurl: {}\ndate_scraped: {}\n---\n\n{}", id, scraped, text);

        let write_error = |source: std::io::Error| RenderError::Write {
            path: path.display().to_string(),
            source,
        };
        fs::create_dir_all(&self.output_dir).map_err(write_error)?;
        fs::write(&path, markdown).map_err(write_error)?;

        tracing::debug!("Wrote {} ({} bytes of text)", path.display(), text.len());
        Ok(Materialized {
            output_name,
            output_location: path.display().to_string(),
        })
    }
}
