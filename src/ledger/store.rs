//! On-disk ledger storage
//!
//! Loading never fails: a missing file yields an empty ledger, and an
//! unreadable or corrupt one yields an empty ledger plus a warning, so the run
//! simply treats every document as new. Persisting writes to a sibling
//! temporary file and renames it over the ledger, so a crash mid-write leaves
//! the previous version intact.

use crate::ledger::{Ledger, LedgerError, LedgerResult};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Outcome of reading the ledger file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// No ledger file exists yet
    Missing,
    /// The file was read and parsed; carries the entry count
    Loaded(usize),
    /// The file exists but could not be read or parsed; carries the reason
    Degraded(String),
}

impl LoadStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

/// File-backed ledger store
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the ledger, degrading to an empty one on any problem
    pub fn load(&self) -> Ledger {
        self.load_with_status().0
    }

    /// Loads the ledger and reports how the load went
    pub fn load_with_status(&self) -> (Ledger, LoadStatus) {
        match self.try_load() {
            Ok(Some(ledger)) => {
                tracing::info!(
                    "Loaded ledger from {} ({} entries)",
                    self.path.display(),
                    ledger.len()
                );
                let count = ledger.len();
                (ledger, LoadStatus::Loaded(count))
            }
            Ok(None) => {
                tracing::info!(
                    "No ledger at {}, every document counts as new",
                    self.path.display()
                );
                (Ledger::new(), LoadStatus::Missing)
            }
            Err(e) => {
                tracing::warn!("Could not load ledger, starting fresh: {}", e);
                (Ledger::new(), LoadStatus::Degraded(e.to_string()))
            }
        }
    }

    /// Reads and parses the ledger file
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Ledger))` - The file was parsed
    /// * `Ok(None)` - The file does not exist
    /// * `Err(LedgerError)` - The file could not be read or parsed
    pub fn try_load(&self) -> LedgerResult<Option<Ledger>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LedgerError::Io(e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| LedgerError::Corrupt {
                path: self.path.display().to_string(),
                source,
            })
    }

    /// Writes the full ledger back to disk atomically
    pub fn persist(&self, ledger: &Ledger) -> LedgerResult<()> {
        let mut encoded = serde_json::to_string_pretty(ledger)?;
        encoded.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.write_error(source))?;
        }

        let tmp_path = self.tmp_path();
        let write_tmp = || -> std::io::Result<()> {
            let mut file = File::create(&tmp_path)?;
            file.write_all(encoded.as_bytes())?;
            file.sync_all()
        };

        if let Err(source) = write_tmp().and_then(|_| fs::rename(&tmp_path, &self.path)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(self.write_error(source));
        }

        tracing::info!(
            "Saved ledger to {} ({} entries)",
            self.path.display(),
            ledger.len()
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_error(&self, source: std::io::Error) -> LedgerError {
        LedgerError::Write {
            path: self.path.display().to_string(),
            source,
        }
    }
}
