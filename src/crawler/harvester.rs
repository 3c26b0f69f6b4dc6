//! Harvest orchestration
//!
//! One run goes through:
//! 1. Loading the ledger (missing or corrupt files degrade to empty)
//! 2. Discovering document identities under the site root
//! 3. Selecting an ordered, bounded subset
//! 4. For each selected document, strictly one at a time: fetch, fingerprint,
//!    decide, and materialize when the policy says so
//! 5. Persisting the ledger
//!
//! Per-document failures are logged with the document's identity, counted and
//! skipped. Only failures outside the per-document loop fail the run.

use crate::config::Config;
use crate::crawler::lock::RunLock;
use crate::crawler::selection::{select, DiscoveredSet};
use crate::crawler::traits::{Discoverer, FetchError, Fetcher, Renderer};
use crate::fingerprint::fingerprint;
use crate::ledger::{Ledger, LedgerEntry, LedgerStore, LoadStatus};
use crate::policy::{decide, PolicyFlags};
use crate::report::{FailureStage, RunOutcome, RunTally, SecondaryFailure};
use crate::url::{normalize_url, DocumentId};
use crate::HarvestError;
use std::path::Path;
use std::time::Instant;

/// Mutable bookkeeping of one run
#[derive(Debug, Default)]
struct RunState {
    tally: RunTally,
    discovered: usize,
    selected: usize,
    ledger_mutated: bool,
}

/// Drives discovery, selection and the per-document loop
pub struct Harvester<D, F, R> {
    config: Config,
    discoverer: D,
    fetcher: F,
    renderer: R,
    store: LedgerStore,
    ledger: Ledger,
    use_lock: bool,
}

impl<D: Discoverer, F: Fetcher, R: Renderer> Harvester<D, F, R> {
    /// Creates a harvester whose ledger lives at `config.ledger_path()`
    pub fn new(config: Config, discoverer: D, fetcher: F, renderer: R) -> Self {
        let store = LedgerStore::new(config.ledger_path());
        Self {
            config,
            discoverer,
            fetcher,
            renderer,
            store,
            ledger: Ledger::new(),
            use_lock: true,
        }
    }

    /// Skips the run lock (for callers that serialize runs themselves)
    pub fn without_lock(mut self) -> Self {
        self.use_lock = false;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ledger as of the end of the last run
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Runs one harvest
    ///
    /// Never returns early with an error: fatal failures end up in
    /// [`RunOutcome::result`], non-fatal ones in
    /// [`RunOutcome::secondary_failures`].
    pub async fn run(&mut self) -> RunOutcome {
        let started_at = chrono::Local::now();
        let start = Instant::now();
        let mut state = RunState::default();
        let mut secondary_failures = Vec::new();

        let _lock = if self.use_lock {
            match RunLock::acquire(Path::new(&self.config.output.output_dir)) {
                Ok(lock) => Some(lock),
                Err(e) => {
                    tracing::error!("{}", e);
                    return RunOutcome::failed(e, started_at, start.elapsed());
                }
            }
        } else {
            None
        };

        let (ledger, status) = self.store.load_with_status();
        if let LoadStatus::Degraded(reason) = status {
            secondary_failures.push(SecondaryFailure::LedgerLoad {
                path: self.store.path().display().to_string(),
                error: reason,
            });
        }
        self.ledger = ledger;

        let result = self.harvest(&mut state).await;
        if let Err(e) = &result {
            tracing::error!("Harvest failed: {}", e);
        }

        // A failed run only writes the ledger back if it recorded something
        if result.is_ok() || state.ledger_mutated {
            if let Err(e) = self.store.persist(&self.ledger) {
                tracing::error!(
                    "Failed to persist ledger {}: {}. The next run will reprocess these documents.",
                    self.store.path().display(),
                    e
                );
                secondary_failures.push(SecondaryFailure::LedgerPersist {
                    path: self.store.path().display().to_string(),
                    error: e.to_string(),
                });
            }
        }

        RunOutcome {
            result,
            tally: state.tally,
            discovered: state.discovered,
            selected: state.selected,
            secondary_failures,
            started_at,
            duration: start.elapsed(),
        }
    }

    async fn harvest(&mut self, state: &mut RunState) -> Result<(), HarvestError> {
        let root = normalize_url(&self.config.crawler.base_url)?;
        tracing::info!("Discovering documents under {}", root);

        let discovered: DiscoveredSet = self.discoverer.discover(&root).await?.into_iter().collect();
        state.discovered = discovered.len();

        let strategy = self.config.crawler.sort_method;
        let selection = select(&discovered, strategy, self.config.crawler.max_documents);
        state.selected = selection.len();
        tracing::info!(
            "Selected {} of {} documents ({})",
            selection.len(),
            discovered.len(),
            strategy.describe()
        );

        let flags = self.config.policy_flags();
        let delay = self.config.request_delay();
        let total = selection.len();

        for (index, id) in selection.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            tracing::info!("Processing document {}/{}: {}", index + 1, total, id);
            self.process_document(index, id, flags, state).await;
        }

        tracing::info!(
            "Processed {} documents: {} new, {} updated, {} unchanged, {} errors",
            total,
            state.tally.new_count(),
            state.tally.updated_count(),
            state.tally.unchanged_count(),
            state.tally.error_count()
        );
        Ok(())
    }

    /// Fetch, decide, and materialize one document; failures stay here
    async fn process_document(
        &mut self,
        index: usize,
        id: &DocumentId,
        flags: PolicyFlags,
        state: &mut RunState,
    ) {
        let timeout = self.config.fetch_timeout();
        let fetched = match tokio::time::timeout(timeout, self.fetcher.fetch(id)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(timeout)),
        };

        let content = match fetched {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("Failed to fetch {}: {}", id, e);
                state.tally.record_failure(id.clone(), FailureStage::Fetch, e.to_string());
                return;
            }
        };

        let fresh = fingerprint(&content.body);
        let decision = decide(id, &fresh, &self.ledger, flags);
        state.tally.record_decision(id.clone(), decision.reason);

        if !decision.should_process {
            tracing::info!("Skipping {}: {}", id, decision.reason);
            state.tally.record_unchanged(id.clone());
            return;
        }

        let materialized = match self.renderer.materialize(&content, id, index) {
            Ok(materialized) => materialized,
            Err(e) => {
                tracing::error!("Failed to render {}: {}", id, e);
                state.tally.record_failure(id.clone(), FailureStage::Render, e.to_string());
                return;
            }
        };

        let location = materialized.output_location.clone();
        let entry = LedgerEntry::new(materialized.output_name, fresh, materialized.output_location);
        let previous = self.ledger.put(id.clone(), entry);
        state.ledger_mutated = true;

        match previous {
            Some(_) => {
                tracing::info!("Updated: {} ({})", location, decision.reason);
                state.tally.record_updated(id.clone());
            }
            None => {
                tracing::info!("Saved: {} ({})", location, decision.reason);
                state.tally.record_new(id.clone());
            }
        }
    }
}
