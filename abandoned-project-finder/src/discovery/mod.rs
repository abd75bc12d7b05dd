//! Candidate discovery using the GitHub repository search API.
//!
//! Search results are paged lazily: a page is only requested once the
//! previous one has been consumed and the candidate cap is still unmet.

mod query;

pub use query::SearchQuery;

use crate::client::{ClientError, GitHubClient, SearchPage, Transport, MAX_PER_PAGE};
use crate::rate_limit::Clock;
use crate::repository::RepositorySummary;
use futures::stream::{self, Stream, TryStreamExt};
use std::collections::HashSet;
use tracing::{debug, info, info_span, warn, Instrument};

/// Streams search result pages starting from page 1.
///
/// The stream stops after the last page GitHub reports. Each call creates a
/// fresh stream, so a search can always be restarted from scratch.
pub fn search_pages<'a, T: Transport, C: Clock>(
    client: &'a GitHubClient<T, C>,
    query: &SearchQuery,
    per_page: u8,
) -> impl Stream<Item = Result<SearchPage, ClientError>> + 'a {
    let query = query.to_query_string();
    stream::try_unfold(Some(1u32), move |page| {
        let query = query.clone();
        async move {
            let Some(page) = page else {
                return Ok(None);
            };
            debug!(page, query = %query, "Fetching search page");
            let result = client.search_repositories(&query, page, per_page).await?;
            let next = result.has_more.then_some(page + 1);
            Ok::<_, ClientError>(Some((result, next)))
        }
    })
}

/// Finds up to `max_results` candidate repositories.
///
/// Results are deduplicated by identity, never below `query.min_stars`, and
/// ordered by stars descending with ties broken by identity ascending so the
/// set is stable across runs.
///
/// # Errors
///
/// Returns [`ClientError`] if a search page cannot be fetched.
pub async fn find_candidates<T: Transport, C: Clock>(
    client: &GitHubClient<T, C>,
    query: &SearchQuery,
    max_results: usize,
) -> Result<Vec<RepositorySummary>, ClientError> {
    let span = info_span!(
        "discover",
        min_stars = query.min_stars,
        language = query.language.as_deref().unwrap_or("any"),
        max_results
    );

    async {
        info!("Starting candidate search");

        let per_page = u8::try_from(max_results.clamp(1, usize::from(MAX_PER_PAGE)))
            .unwrap_or(MAX_PER_PAGE);
        let pages = search_pages(client, query, per_page);
        futures::pin_mut!(pages);

        let mut found = Vec::new();
        let mut pages_fetched = 0u32;
        while let Some(page) = pages.try_next().await? {
            pages_fetched += 1;
            if page.skipped > 0 {
                warn!(skipped = page.skipped, "Dropped malformed search results");
            }
            found.extend(
                page.items
                    .into_iter()
                    .filter(|repo| repo.stars >= query.min_stars),
            );
            found = deduplicate_results(found);

            // Stop before requesting another page once the cap is met.
            if found.len() >= max_results {
                break;
            }
        }

        order_candidates(&mut found);
        found.truncate(max_results);

        info!(count = found.len(), pages = pages_fetched, "Discovery complete");
        Ok(found)
    }
    .instrument(span)
    .await
}

/// Deduplicates search results by repository identity.
///
/// If a repository shows up on multiple pages, only the first is kept.
fn deduplicate_results(results: Vec<RepositorySummary>) -> Vec<RepositorySummary> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|repo| seen.insert(repo.id.clone()))
        .collect()
}

/// Sorts by stars descending, then identity ascending.
fn order_candidates(candidates: &mut [RepositorySummary]) {
    candidates.sort_by(|a, b| b.stars.cmp(&a.stars).then_with(|| a.id.cmp(&b.id)));
}
