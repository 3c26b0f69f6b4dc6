//! Run report artifact
//!
//! Every run, successful or not, leaves a JSON report in the artifacts
//! directory: a timestamped `run_YYYYMMDD_HHMMSS.json` and a copy named
//! `latest.json` for quick access to the most recent run.

use crate::config::Config;
use crate::report::{ItemFailure, RunOutcome, SecondaryFailure};
use crate::url::DocumentId;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors writing the run report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to serialize run report: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Counters as recorded in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportStats {
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
    pub unchanged: usize,
    pub errors: usize,
    pub total_processed: usize,
}

/// Where the run happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentInfo {
    pub crate_version: String,
    pub os: String,
    pub arch: String,
}

impl EnvironmentInfo {
    pub fn current() -> Self {
        Self {
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}

/// JSON run report
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Start of the run, RFC 3339
    pub timestamp: String,
    pub success: bool,
    pub duration_seconds: f64,
    pub stats: ReportStats,
    /// Effective configuration after overrides
    pub config: Config,
    /// SHA-256 of the configuration file, when one was used
    pub config_hash: Option<String>,
    pub new_articles: Vec<DocumentId>,
    pub updated_articles: Vec<DocumentId>,
    pub failed_articles: Vec<ItemFailure>,
    pub total_articles_found: usize,
    pub selected: usize,
    pub error: Option<String>,
    pub secondary_failures: Vec<SecondaryFailure>,
    pub environment: EnvironmentInfo,
}

impl RunReport {
    pub fn new(outcome: &RunOutcome, config: &Config, config_hash: Option<String>) -> Self {
        let tally = &outcome.tally;
        let seconds = outcome.duration.as_secs_f64();

        Self {
            timestamp: outcome.started_at.to_rfc3339(),
            success: outcome.is_success(),
            duration_seconds: (seconds * 100.0).round() / 100.0,
            stats: ReportStats {
                added: tally.new_count(),
                updated: tally.updated_count(),
                skipped: outcome.skipped(),
                unchanged: tally.unchanged_count(),
                errors: tally.error_count(),
                total_processed: tally.processed_count(),
            },
            config: config.clone(),
            config_hash,
            new_articles: tally.new.clone(),
            updated_articles: tally.updated.clone(),
            failed_articles: tally.failures.clone(),
            total_articles_found: outcome.discovered,
            selected: outcome.selected,
            error: outcome.error_message(),
            secondary_failures: outcome.secondary_failures.clone(),
            environment: EnvironmentInfo::current(),
        }
    }

    /// File name of the timestamped report
    pub fn file_name(&self, outcome: &RunOutcome) -> String {
        format!("run_{}.json", outcome.started_at.format("%Y%m%d_%H%M%S"))
    }
}

/// Writes the report as `<dir>/<file_name>` and `<dir>/latest.json`
///
/// # Returns
///
/// The path of the timestamped report.
pub fn write_run_report(dir: &Path, file_name: &str, report: &RunReport) -> Result<PathBuf, ReportError> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');

    let write = |path: &Path| {
        fs::write(path, json.as_bytes()).map_err(|source| ReportError::Write {
            path: path.display().to_string(),
            source,
        })
    };

    fs::create_dir_all(dir).map_err(|source| ReportError::Write {
        path: dir.display().to_string(),
        source,
    })?;

    let path = dir.join(file_name);
    write(&path)?;
    write(&dir.join("latest.json"))?;

    tracing::info!("Run report saved: {}", path.display());
    Ok(path)
}
