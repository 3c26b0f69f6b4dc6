//! Human-readable run summary and ledger listing

use crate::config::Config;
use crate::ledger::Ledger;
use crate::report::RunOutcome;
use std::path::Path;

const RULE: &str = "============================================================";

/// Logs the end-of-run summary
///
/// Emitted whatever the outcome, so a failed run still shows how far it got.
pub fn log_summary(outcome: &RunOutcome, config: &Config) {
    let tally = &outcome.tally;

    tracing::info!("{}", RULE);
    tracing::info!("HARVEST SUMMARY");
    tracing::info!("{}", RULE);
    tracing::info!(
        "Total execution time: {:.2} seconds",
        outcome.duration.as_secs_f64()
    );
    tracing::info!("Documents found: {}", outcome.discovered);
    tracing::info!("Documents selected: {}", outcome.selected);
    tracing::info!("Documents added: {}", tally.new_count());
    tracing::info!("Documents updated: {}", tally.updated_count());
    tracing::info!("Documents skipped: {}", outcome.skipped());
    tracing::info!("Total processed: {}", tally.processed_count());
    tracing::info!("Errors: {}", tally.error_count());

    if config.incremental.force_all {
        tracing::info!("Force update: all selected documents were reprocessed");
    } else if !config.incremental.enabled {
        tracing::info!("Incremental updates disabled: all selected documents were reprocessed");
    }

    for failure in &outcome.secondary_failures {
        tracing::warn!("Also: {}", failure);
    }

    match &outcome.result {
        Ok(()) => tracing::info!("Run completed successfully"),
        Err(e) => tracing::error!("Run failed: {}", e),
    }
    tracing::info!("{}", RULE);
}

/// Prints every ledger entry to stdout
pub fn print_ledger(ledger: &Ledger, path: &Path) {
    println!("=== Ledger ===\n");
    println!("File: {}", path.display());
    println!("Entries: {}", ledger.len());
    println!();

    if ledger.is_empty() {
        println!("No documents have been processed yet.");
        return;
    }

    for (id, entry) in ledger {
        println!("{}", id);
        println!("  File: {}", entry.output_location);
        println!("  Hash: {}", entry.fingerprint.short(12));
        println!("  Last processed: {}", entry.last_processed);
    }
}
