//! Tidemark main entry point
//!
//! This is the command-line interface for the Tidemark document harvester.

use anyhow::Context;
use clap::builder::BoolishValueParser;
use clap::{Parser, ValueEnum};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tidemark::config::{resolve_config, Config, ConfigOverrides};
use tidemark::crawler::{build_site_harvester, SortStrategy};
use tidemark::ledger::LedgerStore;
use tidemark::report::{
    log_summary, print_ledger, write_run_report, RunOutcome, RunReport, SecondaryFailure,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Tidemark: an incremental document harvester
///
/// Tidemark discovers the documents listed on a help-center style site,
/// converts each one to Markdown, and on later runs only reprocesses the
/// documents whose content changed.
#[derive(Parser, Debug)]
#[command(name = "tidemark")]
#[command(version)]
#[command(about = "An incremental document harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Explicit log level; overrides -v/-q
    #[arg(long, env = "LOG_LEVEL", value_enum, ignore_case = true)]
    log_level: Option<LogLevel>,

    /// Root URL of the site to harvest
    #[arg(long, env = "BASE_URL")]
    base_url: Option<String>,

    /// Directory receiving the Markdown files and the ledger
    #[arg(long, env = "OUTPUT_DIR")]
    output_dir: Option<String>,

    /// Maximum number of documents processed per run
    #[arg(long, env = "PAGES_TO_CRAWL")]
    max_documents: Option<usize>,

    /// Run without a visible browsing session
    #[arg(long, env = "HEADLESS", value_name = "BOOL", num_args = 0..=1,
          default_missing_value = "true", value_parser = BoolishValueParser::new())]
    headless: Option<bool>,

    /// Ordering before truncation: alphabetical, reverse or discovery_order
    #[arg(long, env = "SORT_METHOD")]
    sort_method: Option<SortStrategy>,

    /// Skip documents whose content is unchanged since the last run
    #[arg(long, env = "INCREMENTAL_UPDATES", value_name = "BOOL", num_args = 0..=1,
          default_missing_value = "true", value_parser = BoolishValueParser::new())]
    incremental: Option<bool>,

    /// Reprocess every selected document regardless of the ledger
    #[arg(long, env = "FORCE_UPDATE_ALL", value_name = "BOOL", num_args = 0..=1,
          default_missing_value = "true", value_parser = BoolishValueParser::new())]
    force_all: Option<bool>,

    /// Per-fetch timeout in milliseconds
    #[arg(long, env = "TIMEOUT")]
    timeout_ms: Option<u64>,

    /// Minimum pause between two documents in milliseconds
    #[arg(long, env = "REQUEST_DELAY_MS")]
    request_delay_ms: Option<u64>,

    /// Run even if another run's lock file is present
    #[arg(long)]
    ignore_lock: bool,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long, conflicts_with = "show_ledger")]
    dry_run: bool,

    /// Print the ledger and exit
    #[arg(long, conflicts_with = "dry_run")]
    show_ledger: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            output_dir: self.output_dir.clone(),
            max_documents: self.max_documents,
            headless: self.headless,
            sort_method: self.sort_method,
            incremental: self.incremental,
            force_all: self.force_all,
            timeout_ms: self.timeout_ms,
            request_delay_ms: self.request_delay_ms,
        }
    }

    fn filter(&self) -> EnvFilter {
        if let Some(level) = self.log_level {
            return match level {
                LogLevel::Trace => EnvFilter::new("tidemark=trace,debug"),
                LogLevel::Debug => EnvFilter::new("tidemark=debug,info"),
                LogLevel::Info => EnvFilter::new("tidemark=info,warn"),
                LogLevel::Warn => EnvFilter::new("warn"),
                LogLevel::Error => EnvFilter::new("error"),
            };
        }

        if self.quiet {
            // Only show errors
            return EnvFilter::new("error");
        }

        match self.verbose {
            0 => EnvFilter::new("tidemark=info,warn"),
            1 => EnvFilter::new("tidemark=debug,info"),
            2 => EnvFilter::new("tidemark=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let harvesting = !cli.dry_run && !cli.show_ledger;

    let resolved = resolve_config(cli.config.as_deref(), cli.overrides());
    let logs_dir = match (&resolved, harvesting) {
        (Ok((config, _)), true) => Some(PathBuf::from(&config.output.logs_dir)),
        _ => None,
    };
    setup_logging(cli.filter(), logs_dir.as_deref());

    let (config, config_hash) = match resolved {
        Ok((config, hash)) => {
            match (&cli.config, &hash) {
                (Some(path), Some(hash)) => tracing::info!(
                    "Configuration loaded from {} (hash: {})",
                    path.display(),
                    hash
                ),
                _ => tracing::info!("Using default configuration with overrides"),
            }
            (config, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.show_ledger {
        handle_show_ledger(&config)
    } else {
        handle_harvest(config, config_hash, cli.ignore_lock).await
    }
}

/// Sets up logging to stdout and, when `logs_dir` is given, to a per-run log file
fn setup_logging(filter: EnvFilter, logs_dir: Option<&Path>) {
    let mut log_path = None;
    let mut file_error = None;

    let file_layer = match logs_dir.map(open_log_file) {
        Some(Ok((file, path))) => {
            log_path = Some(path);
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        Some(Err(e)) => {
            file_error = Some(e);
            None
        }
        None => None,
    };

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    if let Some(path) = log_path {
        tracing::info!("Logging to {}", path.display());
    }
    if let Some(e) = file_error {
        tracing::warn!("Could not create log file, logging to stdout only: {:#}", e);
    }
}

fn open_log_file(logs_dir: &Path) -> anyhow::Result<(File, PathBuf)> {
    fs::create_dir_all(logs_dir)
        .with_context(|| format!("creating {}", logs_dir.display()))?;
    let name = format!("harvest_{}.log", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let path = logs_dir.join(name);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    Ok((file, path))
}

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Tidemark Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Listing page: {}", config.listing_url());
    println!("  Document marker: {}", config.crawler.document_marker);
    println!("  Max documents: {}", config.crawler.max_documents);
    println!("  Sort method: {}", config.crawler.sort_method.describe());
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Timeout: {}ms", config.crawler.timeout_ms);
    println!("  Headless: {}", config.crawler.headless);

    println!("\nIncremental Updates:");
    println!("  Enabled: {}", config.incremental.enabled);
    println!("  Force all: {}", config.incremental.force_all);
    println!("  Ledger: {}", config.ledger_path().display());

    println!("\nOutput:");
    println!("  Documents: {}", config.output.output_dir);
    println!("  Run reports: {}", config.output.artifacts_dir);
    println!("  Logs: {}", config.output.logs_dir);

    println!("\nHTTP Headers ({}):", config.http.headers.len());
    for (name, value) in &config.http.headers {
        println!("  {}: {}", name, value);
    }

    let ledger = LedgerStore::new(config.ledger_path()).load();

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would harvest up to {} documents from {} ({} already in the ledger)",
        config.crawler.max_documents,
        config.listing_url(),
        ledger.len()
    );

    Ok(())
}

/// Handles the --show-ledger mode: prints every ledger entry
fn handle_show_ledger(config: &Config) -> anyhow::Result<()> {
    let store = LedgerStore::new(config.ledger_path());
    let ledger = store
        .try_load()
        .with_context(|| format!("reading ledger {}", store.path().display()))?
        .unwrap_or_default();

    print_ledger(&ledger, store.path());
    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: Config,
    config_hash: Option<String>,
    ignore_lock: bool,
) -> anyhow::Result<()> {
    tracing::info!("Starting harvest of {}", config.listing_url());
    tracing::info!(
        "Max documents: {}, sort: {}, incremental: {}, force all: {}",
        config.crawler.max_documents,
        config.crawler.sort_method,
        config.incremental.enabled,
        config.incremental.force_all
    );

    let started_at = chrono::Local::now();
    let mut outcome = match build_site_harvester(config.clone()) {
        Ok(mut harvester) => {
            if ignore_lock {
                tracing::warn!("Ignoring the run lock");
                harvester = harvester.without_lock();
            }
            harvester.run().await
        }
        Err(e) => {
            tracing::error!("Failed to set up the harvester: {}", e);
            RunOutcome::failed(e, started_at, Duration::ZERO)
        }
    };

    let report = RunReport::new(&outcome, &config, config_hash);
    let artifacts_dir = Path::new(&config.output.artifacts_dir);
    let file_name = report.file_name(&outcome);
    if let Err(e) = write_run_report(artifacts_dir, &file_name, &report) {
        tracing::error!("Failed to save run report: {}", e);
        outcome.secondary_failures.push(SecondaryFailure::ReportWrite {
            path: artifacts_dir.join(&file_name).display().to_string(),
            error: e.to_string(),
        });
    }

    log_summary(&outcome, &config);

    outcome.result.map_err(anyhow::Error::from)
}
