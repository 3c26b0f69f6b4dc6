//! Run lock
//!
//! Two harvests writing the same ledger would overwrite each other's
//! entries. [`RunLock`] claims a lock file in the output directory for the
//! lifetime of a run and releases it on drop.

use crate::HarvestError;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Lock file name inside the output directory
pub const LOCK_FILE_NAME: &str = ".tidemark.lock";

/// Held for the duration of one run
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Claims the lock in `output_dir`, creating the directory if needed
    ///
    /// Fails with [`HarvestError::Locked`] if another run holds it. A lock
    /// left behind by a crashed run has to be removed by hand.
    pub fn acquire(output_dir: &Path) -> crate::Result<Self> {
        Self::acquire_with(output_dir, |file| {
            writeln!(
                file,
                "pid={}\nstarted={}",
                std::process::id(),
                chrono::Local::now().to_rfc3339()
            )
        })
    }

    fn acquire_with(
        output_dir: &Path,
        stamp: impl FnOnce(&mut File) -> std::io::Result<()>,
    ) -> crate::Result<Self> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(LOCK_FILE_NAME);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(HarvestError::Locked { path });
            }
            Err(e) => return Err(e.into()),
        };

        // Dropping the guard on a failed stamp removes the file again
        let lock = Self { path };
        let stamped = stamp(&mut file);
        drop(file);
        stamped?;

        tracing::debug!("Acquired run lock {}", lock.path.display());
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("Failed to release run lock {}: {}", self.path.display(), e);
        }
    }
}
