//! Fixed report schema.

use crate::repository::AbandonedCandidate;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Report columns, in output order.
pub const REPORT_COLUMNS: [&str; 11] = [
    "name",
    "owner",
    "url",
    "stars",
    "last_commit",
    "days_abandoned",
    "open_issues",
    "score",
    "active_fork_name",
    "active_fork_url",
    "active_fork_last_commit",
];

/// One report row.
///
/// Field order matches [`REPORT_COLUMNS`]. Fork columns are empty when no
/// maintained fork was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub name: String,
    pub owner: String,
    pub url: String,
    pub stars: u64,
    pub last_commit: NaiveDate,
    pub days_abandoned: u64,
    pub open_issues: u64,
    pub score: f64,
    pub active_fork_name: String,
    pub active_fork_url: String,
    pub active_fork_last_commit: Option<NaiveDate>,
}

impl From<&AbandonedCandidate> for ReportRow {
    fn from(candidate: &AbandonedCandidate) -> Self {
        let repository = &candidate.repository;
        let fork = candidate.active_fork.as_ref();

        Self {
            name: repository.id.name().to_string(),
            owner: repository.id.owner().to_string(),
            url: repository.url.clone(),
            stars: repository.stars,
            last_commit: candidate.last_commit.date_naive(),
            days_abandoned: candidate.days_since_last_commit,
            open_issues: repository.open_issues,
            score: candidate.score,
            active_fork_name: fork.map(|f| f.id.full_name()).unwrap_or_default(),
            active_fork_url: fork.map(|f| f.url.clone()).unwrap_or_default(),
            active_fork_last_commit: fork.map(|f| f.last_commit.date_naive()),
        }
    }
}
