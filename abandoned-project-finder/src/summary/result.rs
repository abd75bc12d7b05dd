//! Per-candidate outcome types.

use crate::repository::{AbandonedCandidate, RepoId};

/// Result of processing a single candidate.
#[derive(Debug, Clone)]
pub enum CandidateOutcome {
    /// Confirmed abandoned, scored and headed for the report.
    Reported(Box<AbandonedCandidate>),

    /// Committed to within the threshold.
    Excluded {
        /// Repository identity.
        repository: RepoId,
        /// Whole days since its last commit.
        days_since_last_commit: u64,
    },

    /// Could not be analysed.
    Skipped {
        /// Repository identity.
        repository: RepoId,
        /// Reason for skipping.
        reason: String,
    },
}

impl CandidateOutcome {
    /// Identity of the repository this outcome is about.
    pub fn repository(&self) -> &RepoId {
        match self {
            Self::Reported(candidate) => candidate.id(),
            Self::Excluded { repository, .. } | Self::Skipped { repository, .. } => repository,
        }
    }
}
