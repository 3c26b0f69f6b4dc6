//! Result of one harvest run

use crate::report::RunTally;
use crate::HarvestError;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// A problem that did not change the run's primary result
///
/// These are reported next to the outcome rather than replacing it: a run
/// that failed discovery and then also failed to persist the ledger reports
/// the discovery failure as its result and the persist failure here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SecondaryFailure {
    /// The ledger file existed but could not be used; the run started empty
    LedgerLoad { path: String, error: String },
    /// The ledger could not be written back
    LedgerPersist { path: String, error: String },
    /// The run report could not be written
    ReportWrite { path: String, error: String },
}

impl fmt::Display for SecondaryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LedgerLoad { path, error } => {
                write!(f, "ledger {} unusable, started empty: {}", path, error)
            }
            Self::LedgerPersist { path, error } => {
                write!(f, "failed to persist ledger {}: {}", path, error)
            }
            Self::ReportWrite { path, error } => {
                write!(f, "failed to write run report {}: {}", path, error)
            }
        }
    }
}

/// Everything a caller needs to know about a finished run
#[derive(Debug)]
pub struct RunOutcome {
    /// `Err` only for run-fatal failures (setup, lock, discovery)
    pub result: Result<(), HarvestError>,
    pub tally: RunTally,
    /// Unique documents discovered
    pub discovered: usize,
    /// Documents selected for this run
    pub selected: usize,
    pub secondary_failures: Vec<SecondaryFailure>,
    pub started_at: DateTime<Local>,
    pub duration: Duration,
}

impl RunOutcome {
    /// Outcome of a run that stopped before any document was considered
    pub fn failed(error: HarvestError, started_at: DateTime<Local>, duration: Duration) -> Self {
        Self {
            result: Err(error),
            tally: RunTally::new(),
            discovered: 0,
            selected: 0,
            secondary_failures: Vec::new(),
            started_at,
            duration,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Fatal error message, if the run failed
    pub fn error_message(&self) -> Option<String> {
        self.result.as_ref().err().map(|e| e.to_string())
    }

    pub fn skipped(&self) -> usize {
        self.tally.skipped(self.selected)
    }
}
