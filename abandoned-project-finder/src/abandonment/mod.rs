//! Staleness check for candidate repositories.

use crate::client::{ClientError, GitHubClient, Transport};
use crate::rate_limit::Clock;
use crate::repository::{AbandonedCandidate, RepositorySummary};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Result of checking a single repository.
#[derive(Debug, Clone, PartialEq)]
pub enum Abandonment {
    /// Inactive for at least the threshold.
    Abandoned(AbandonedCandidate),
    /// Committed to within the threshold.
    Active {
        /// The repository that was checked.
        repository: RepositorySummary,
        /// Whole days since its last commit.
        days_since_last_commit: u64,
    },
}

/// Whole days from `earlier` to `as_of`, rounded down and never negative.
pub fn days_between(earlier: DateTime<Utc>, as_of: DateTime<Utc>) -> u64 {
    u64::try_from((as_of - earlier).num_days()).unwrap_or(0)
}

/// Returns true if `last_commit` is at least `threshold_days` whole days before `as_of`.
pub fn is_abandoned(last_commit: DateTime<Utc>, threshold_days: u64, as_of: DateTime<Utc>) -> bool {
    days_between(last_commit, as_of) >= threshold_days
}

/// Fetches the last commit of `repository` and classifies it.
///
/// `as_of` must be the run's fixed reference instant so every repository is
/// judged against the same moment.
///
/// # Errors
///
/// Returns [`ClientError`] if the last commit cannot be retrieved.
pub async fn check_abandonment<T: Transport, C: Clock>(
    client: &GitHubClient<T, C>,
    repository: RepositorySummary,
    threshold_days: u64,
    as_of: DateTime<Utc>,
) -> Result<Abandonment, ClientError> {
    let last_commit = client.last_commit(&repository.id).await?;
    let days = days_between(last_commit, as_of);
    debug!(
        repo = %repository.id,
        last_commit = %last_commit,
        days,
        "Fetched last commit"
    );

    if is_abandoned(last_commit, threshold_days, as_of) {
        Ok(Abandonment::Abandoned(AbandonedCandidate::new(
            repository,
            last_commit,
            days,
        )))
    } else {
        Ok(Abandonment::Active {
            repository,
            days_since_last_commit: days,
        })
    }
}
