//! Search-stage repository summary.

use super::RepoId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A repository returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositorySummary {
    /// Repository identity.
    pub id: RepoId,

    /// Browser URL of the repository.
    pub url: String,

    /// Stargazer count.
    pub stars: u64,

    /// Last push reported by the search endpoint.
    pub pushed_at: DateTime<Utc>,

    /// Open issues (GitHub counts open pull requests here too).
    pub open_issues: u64,
}
