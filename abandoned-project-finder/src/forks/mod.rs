//! Maintained fork discovery.
//!
//! Lists the forks of an abandoned repository and picks the one with the
//! most recent commit inside the activity window.

use crate::abandonment::days_between;
use crate::client::{ClientError, ForkListing, GitHubClient, Transport, MAX_PER_PAGE};
use crate::rate_limit::Clock;
use crate::repository::{MaintainedFork, RepoId};
use chrono::{DateTime, Utc};
use tracing::{debug, info_span, warn, Instrument};

/// Default activity window for forks (6 months).
pub const DEFAULT_RECENT_DAYS: u64 = 180;

/// Parameters for fork discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkSettings {
    /// A fork qualifies if its last commit is at most this many days old.
    pub recent_days: u64,
    /// Maximum forks listed per repository; `None` lists every page.
    pub scan_limit: Option<usize>,
    /// Forks with fewer stars are ignored.
    pub min_stars: u64,
}

impl Default for ForkSettings {
    fn default() -> Self {
        Self {
            recent_days: DEFAULT_RECENT_DAYS,
            scan_limit: None,
            min_stars: 0,
        }
    }
}

/// Finds the most recently active fork of `repo`.
///
/// Returns `None` both when the repository has no forks and when none of
/// them was committed to within `settings.recent_days` of `as_of`.
///
/// # Errors
///
/// Returns [`ClientError`] if the fork list cannot be fetched, or a fatal
/// error occurs while checking a fork. Non-fatal errors on individual forks
/// only skip that fork.
pub async fn find_active_fork<T: Transport, C: Clock>(
    client: &GitHubClient<T, C>,
    repo: &RepoId,
    settings: &ForkSettings,
    as_of: DateTime<Utc>,
) -> Result<Option<MaintainedFork>, ClientError> {
    let span = info_span!("forks", repo = %repo);

    async {
        let listings = list_forks(client, repo, settings.scan_limit).await?;
        debug!(count = listings.len(), "Listed forks");

        let mut qualifying = Vec::new();
        for listing in listings {
            if !worth_checking(&listing, settings, as_of) {
                continue;
            }

            match client.last_commit(&listing.id).await {
                Ok(last_commit) => {
                    if days_between(last_commit, as_of) <= settings.recent_days {
                        qualifying.push(MaintainedFork {
                            id: listing.id,
                            url: listing.url,
                            last_commit,
                            stars: listing.stars,
                        });
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(fork = %listing.id, error = %e, "Skipping fork");
                }
            }
        }

        Ok(select_most_recent(qualifying))
    }
    .instrument(span)
    .await
}

/// Lists every fork, or the first `limit` of them, across as many pages as needed.
async fn list_forks<T: Transport, C: Clock>(
    client: &GitHubClient<T, C>,
    repo: &RepoId,
    limit: Option<usize>,
) -> Result<Vec<ForkListing>, ClientError> {
    let per_page = limit
        .and_then(|limit| u8::try_from(limit.clamp(1, usize::from(MAX_PER_PAGE))).ok())
        .unwrap_or(MAX_PER_PAGE);
    let mut forks = Vec::new();
    let mut page = 1;

    loop {
        let result = client.list_forks(repo, page, per_page).await?;
        forks.extend(result.forks);

        if let Some(limit) = limit.filter(|&limit| forks.len() >= limit) {
            if result.has_more || forks.len() > limit {
                warn!(limit, "Fork scan limit reached, remaining forks not inspected");
            }
            forks.truncate(limit);
            break;
        }
        if !result.has_more {
            break;
        }
        page += 1;
    }

    Ok(forks)
}

/// Cheap pre-filter on listing data, saving one commit lookup per rejected fork.
///
/// A fork cannot hold a commit newer than its last push.
fn worth_checking(listing: &ForkListing, settings: &ForkSettings, as_of: DateTime<Utc>) -> bool {
    if listing.stars < settings.min_stars {
        return false;
    }
    match listing.pushed_at {
        Some(pushed_at) => days_between(pushed_at, as_of) <= settings.recent_days,
        None => true,
    }
}

/// Picks the fork with the newest commit; ties go to the smallest identity.
pub fn select_most_recent(forks: Vec<MaintainedFork>) -> Option<MaintainedFork> {
    forks.into_iter().max_by(|a, b| {
        a.last_commit
            .cmp(&b.last_commit)
            .then_with(|| b.id.cmp(&a.id))
    })
}
