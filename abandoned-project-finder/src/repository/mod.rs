//! Repository identities and the records that flow through the pipeline.

mod candidate;
mod id;
mod summary;

pub use candidate::{AbandonedCandidate, MaintainedFork};
pub use id::{RepoId, RepoIdError};
pub use summary::RepositorySummary;
