//! Run reporting
//!
//! This module handles:
//! - Counting what happened to each selected document ([`RunTally`])
//! - The overall result of a run ([`RunOutcome`])
//! - Writing the JSON run report artifact
//! - Logging the human-readable summary

mod outcome;
mod run_report;
mod summary;
mod tally;

pub use outcome::{RunOutcome, SecondaryFailure};
pub use run_report::{write_run_report, EnvironmentInfo, ReportError, ReportStats, RunReport};
pub use summary::{log_summary, print_ledger};
pub use tally::{FailureStage, ItemFailure, RunTally};
