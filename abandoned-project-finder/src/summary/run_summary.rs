//! Run summary types.

use super::result::CandidateOutcome;

/// Summary of a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Candidates returned by the search stage.
    pub candidates_found: usize,

    /// Candidates whose last commit was retrieved.
    pub analyzed: usize,

    /// Candidates confirmed abandoned.
    pub abandoned: usize,

    /// Candidates committed to within the threshold.
    pub excluded: usize,

    /// Candidates that could not be analysed.
    pub skipped: usize,

    /// Abandoned candidates with a maintained fork.
    pub forks_found: usize,

    /// Rows written to the report.
    pub rows_written: usize,

    /// Whether the run stopped early on request.
    pub cancelled: bool,
}

impl RunSummary {
    /// Creates a summary for a run over `candidates_found` candidates.
    #[must_use]
    pub fn new(candidates_found: usize) -> Self {
        Self {
            candidates_found,
            ..Default::default()
        }
    }

    /// Updates the summary with a candidate outcome.
    pub fn record_result(&mut self, outcome: &CandidateOutcome) {
        match outcome {
            CandidateOutcome::Reported(candidate) => {
                self.analyzed += 1;
                self.abandoned += 1;
                if candidate.active_fork.is_some() {
                    self.forks_found += 1;
                }
            }
            CandidateOutcome::Excluded { .. } => {
                self.analyzed += 1;
                self.excluded += 1;
            }
            CandidateOutcome::Skipped { .. } => self.skipped += 1,
        }
    }

    /// Candidates never reached because the run was cancelled.
    #[must_use]
    pub fn unprocessed(&self) -> usize {
        self.candidates_found
            .saturating_sub(self.analyzed + self.skipped)
    }

    /// Returns true if any candidate was skipped.
    #[must_use]
    pub fn has_skips(&self) -> bool {
        self.skipped > 0
    }
}
