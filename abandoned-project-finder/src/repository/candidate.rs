//! Abandoned candidates and their maintained forks.

use super::{RepoId, RepositorySummary};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A fork with recent commit activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintainedFork {
    /// Fork identity.
    pub id: RepoId,

    /// Browser URL of the fork.
    pub url: String,

    /// Timestamp of the newest commit on the fork's default branch.
    pub last_commit: DateTime<Utc>,

    /// Stargazer count of the fork.
    pub stars: u64,
}

/// A repository confirmed inactive beyond the configured threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbandonedCandidate {
    /// What the search stage found.
    pub repository: RepositorySummary,

    /// Timestamp of the newest commit on the default branch.
    pub last_commit: DateTime<Utc>,

    /// Whole days between `last_commit` and the run's reference instant.
    pub days_since_last_commit: u64,

    /// Most recently active qualifying fork, if any.
    pub active_fork: Option<MaintainedFork>,

    /// Abandonment score; zero until scored.
    pub score: f64,
}

impl AbandonedCandidate {
    /// Creates an unscored candidate without a fork.
    pub fn new(
        repository: RepositorySummary,
        last_commit: DateTime<Utc>,
        days_since_last_commit: u64,
    ) -> Self {
        Self {
            repository,
            last_commit,
            days_since_last_commit,
            active_fork: None,
            score: 0.0,
        }
    }

    /// Repository identity.
    pub fn id(&self) -> &RepoId {
        &self.repository.id
    }

    /// Attaches the fork found by fork discovery.
    #[must_use]
    pub fn with_fork(mut self, fork: Option<MaintainedFork>) -> Self {
        self.active_fork = fork;
        self
    }

    /// Attaches the computed score.
    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}
