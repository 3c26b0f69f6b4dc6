//! Change-detection policy
//!
//! Decides whether a freshly fetched document must be (re)materialized. The
//! rules are checked in priority order and the first match wins:
//!
//! | # | Condition | Process | Reason |
//! |---|-----------|---------|--------|
//! | 1 | force-all flag set | yes | `ForceAll` |
//! | 2 | incremental mode off | yes | `IncrementalDisabled` |
//! | 3 | no ledger entry | yes | `New` |
//! | 4 | stored fingerprint differs | yes | `ContentChanged` |
//! | 5 | otherwise | no | `Unchanged` |

use crate::fingerprint::ContentFingerprint;
use crate::ledger::Ledger;
use crate::url::DocumentId;
use std::fmt;

/// Run-wide switches consulted by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyFlags {
    /// Reprocess every selected document regardless of the ledger
    pub force_all: bool,
    /// Skip documents whose fingerprint matches the ledger
    pub incremental: bool,
}

impl Default for PolicyFlags {
    fn default() -> Self {
        Self {
            force_all: false,
            incremental: true,
        }
    }
}

/// Why a document was or was not processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeReason {
    ForceAll,
    IncrementalDisabled,
    New,
    ContentChanged,
    Unchanged,
}

impl ChangeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ForceAll => "force_all",
            Self::IncrementalDisabled => "incremental_disabled",
            Self::New => "new",
            Self::ContentChanged => "content_changed",
            Self::Unchanged => "unchanged",
        }
    }

    /// Returns true if this reason means the document gets materialized
    pub fn should_process(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

impl fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running the policy for one document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub should_process: bool,
    pub reason: ChangeReason,
}

impl From<ChangeReason> for Decision {
    fn from(reason: ChangeReason) -> Self {
        Self {
            should_process: reason.should_process(),
            reason,
        }
    }
}

/// Decides whether `id` must be materialized given its fresh fingerprint
///
/// Pure: reads the ledger, never mutates it.
pub fn decide(
    id: &DocumentId,
    fresh: &ContentFingerprint,
    ledger: &Ledger,
    flags: PolicyFlags,
) -> Decision {
    let reason = if flags.force_all {
        ChangeReason::ForceAll
    } else if !flags.incremental {
        ChangeReason::IncrementalDisabled
    } else {
        match ledger.get(id) {
            None => ChangeReason::New,
            Some(entry) if entry.fingerprint != *fresh => ChangeReason::ContentChanged,
            Some(_) => ChangeReason::Unchanged,
        }
    };

    Decision::from(reason)
}
