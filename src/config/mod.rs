//! Configuration module for Tidemark
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and layering command-line/environment overrides on top.
//!
//! # Example
//!
//! ```no_run
//! use tidemark::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("tidemark.toml")).unwrap();
//! println!("Harvesting up to {} documents", config.crawler.max_documents);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ContentConfig, CrawlerConfig, HttpConfig, IncrementalConfig, OutputConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, resolve_config, ConfigOverrides,
};
