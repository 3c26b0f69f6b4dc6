use crate::config::types::Config;
use crate::config::validation::validate;
use crate::crawler::SortStrategy;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Values that take precedence over the configuration file
///
/// The binary fills this from command-line flags and their environment
/// variables; `None` leaves the file (or default) value untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub output_dir: Option<String>,
    pub max_documents: Option<usize>,
    pub headless: Option<bool>,
    pub sort_method: Option<SortStrategy>,
    pub incremental: Option<bool>,
    pub force_all: Option<bool>,
    pub timeout_ms: Option<u64>,
    pub request_delay_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Applies every set override to `config`
    pub fn apply(self, config: &mut Config) {
        if let Some(base_url) = self.base_url {
            config.crawler.base_url = base_url;
        }
        if let Some(output_dir) = self.output_dir {
            config.output.output_dir = output_dir;
        }
        if let Some(max) = self.max_documents {
            config.crawler.max_documents = max;
        }
        if let Some(headless) = self.headless {
            config.crawler.headless = headless;
        }
        if let Some(sort_method) = self.sort_method {
            config.crawler.sort_method = sort_method;
        }
        if let Some(enabled) = self.incremental {
            config.incremental.enabled = enabled;
        }
        if let Some(force_all) = self.force_all {
            config.incremental.force_all = force_all;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.crawler.timeout_ms = timeout_ms;
        }
        if let Some(delay) = self.request_delay_ms {
            config.crawler.request_delay_ms = delay;
        }
    }
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use tidemark::config::load_config;
///
/// let config = load_config(Path::new("tidemark.toml")).unwrap();
/// println!("Max documents: {}", config.crawler.max_documents);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let mut config = read_config(path)?;
    finalize(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Builds the effective configuration: file (or defaults), then overrides
///
/// # Returns
///
/// The validated configuration and, when a file was used, its SHA-256 hash.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<(Config, Option<String>), ConfigError> {
    let (mut config, hash) = match path {
        Some(path) => (read_config(path)?, Some(compute_config_hash(path)?)),
        None => (Config::default(), None),
    };

    overrides.apply(&mut config);
    finalize(&mut config);
    validate(&config)?;

    Ok((config, hash))
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Recorded in run reports so runs made with different settings can be told
/// apart.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Cleans up values that have an obvious canonical spelling
fn finalize(config: &mut Config) {
    let trimmed = config.crawler.base_url.trim().trim_end_matches('/').to_string();
    config.crawler.base_url = trimmed;
}
