//! Rendering of fetched documents into Markdown files

mod markdown;
mod naming;

pub use markdown::MarkdownRenderer;
pub use naming::{disambiguated_name, document_title, fallback_name, output_file_name, slugify};
