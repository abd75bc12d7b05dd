//! Run summary types and helpers.

mod result;
mod run_summary;

pub use result::CandidateOutcome;
pub use run_summary::RunSummary;
