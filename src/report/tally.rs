//! Per-run counters

use crate::policy::ChangeReason;
use crate::url::DocumentId;
use serde::Serialize;
use std::fmt;

/// Stage at which a document failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Fetch,
    Render,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => f.write_str("fetch"),
            Self::Render => f.write_str("render"),
        }
    }
}

/// One document that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub url: DocumentId,
    pub stage: FailureStage,
    pub error: String,
}

/// What happened to each selected document in one run
///
/// Derived from the ledger mutations of the run; never persisted in the
/// ledger itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunTally {
    pub new: Vec<DocumentId>,
    pub updated: Vec<DocumentId>,
    pub unchanged: Vec<DocumentId>,
    pub failures: Vec<ItemFailure>,
    /// Policy decision for every document that was fetched, in run order
    pub decisions: Vec<(DocumentId, ChangeReason)>,
}

impl RunTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_decision(&mut self, id: DocumentId, reason: ChangeReason) {
        self.decisions.push((id, reason));
    }

    /// Reason recorded for `id`, if it got as far as the policy
    pub fn reason_for(&self, id: &DocumentId) -> Option<ChangeReason> {
        self.decisions
            .iter()
            .find(|(decided, _)| decided == id)
            .map(|(_, reason)| *reason)
    }

    pub fn record_new(&mut self, id: DocumentId) {
        self.new.push(id);
    }

    pub fn record_updated(&mut self, id: DocumentId) {
        self.updated.push(id);
    }

    pub fn record_unchanged(&mut self, id: DocumentId) {
        self.unchanged.push(id);
    }

    pub fn record_failure(&mut self, url: DocumentId, stage: FailureStage, error: impl Into<String>) {
        self.failures.push(ItemFailure {
            url,
            stage,
            error: error.into(),
        });
    }

    pub fn new_count(&self) -> usize {
        self.new.len()
    }

    pub fn updated_count(&self) -> usize {
        self.updated.len()
    }

    pub fn unchanged_count(&self) -> usize {
        self.unchanged.len()
    }

    pub fn error_count(&self) -> usize {
        self.failures.len()
    }

    /// Documents materialized this run (new + updated)
    pub fn processed_count(&self) -> usize {
        self.new.len() + self.updated.len()
    }

    /// Selected documents that were not materialized
    ///
    /// `selected - new - updated`: includes unchanged documents and failures.
    pub fn skipped(&self, selected: usize) -> usize {
        selected.saturating_sub(self.processed_count())
    }
}
