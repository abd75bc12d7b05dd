//! Rate-limited GitHub API client.
//!
//! Every request made by the pipeline goes through [`GitHubClient`], which
//! consults the [`QuotaTracker`] before sending, records the quota headers of
//! every response, waits out exhausted windows and retries transient failures
//! according to its [`RetryPolicy`].

mod error;
mod retry;
mod transport;
mod wire;

pub use error::ClientError;
pub use retry::RetryPolicy;
pub use transport::{ApiResponse, OctocrabTransport, Transport, TransportError};

use crate::rate_limit::{
    Clock, QuotaBucket, QuotaCeiling, QuotaTracker, SystemClock, DEFAULT_SAFETY_MARGIN,
    MAX_WAIT_SECS,
};
use crate::repository::{RepoId, RepositorySummary};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;
use wire::{CommitItem, ErrorBody, ForkItem, RepositoryItem, SearchResponse};

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// The search API never returns more than this many results for a query.
pub const MAX_SEARCH_RESULTS: u64 = 1000;

/// Largest page size GitHub accepts.
pub const MAX_PER_PAGE: u8 = 100;

/// Shortest pause after a quota-exhausted response whose reset already passed.
const MIN_QUOTA_WAIT: Duration = Duration::from_secs(1);

/// Settings for constructing a [`GitHubClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API root, e.g. `https://api.github.com` or a GitHub Enterprise `/api/v3` URL.
    pub api_base: Url,
    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
    /// Initial quota ceilings.
    pub ceiling: QuotaCeiling,
    /// Remaining-request count below which the client waits for reset.
    pub safety_margin: u32,
}

impl ClientOptions {
    /// Creates options for the given API root with default retry and margin.
    pub fn new(api_base: Url, ceiling: QuotaCeiling) -> Self {
        Self {
            api_base,
            retry: RetryPolicy::default(),
            ceiling,
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }
}

/// One page of repository search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    /// Valid repositories on this page.
    pub items: Vec<RepositorySummary>,
    /// Total matches reported by GitHub.
    pub total_count: u64,
    /// Whether another page can be requested.
    pub has_more: bool,
    /// Items dropped because they failed validation.
    pub skipped: usize,
}

/// A fork as listed by the forks endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ForkListing {
    /// Fork identity.
    pub id: RepoId,
    /// Browser URL.
    pub url: String,
    /// Stargazer count.
    pub stars: u64,
    /// Last push, if GitHub reports one.
    pub pushed_at: Option<DateTime<Utc>>,
}

/// One page of forks.
#[derive(Debug, Clone, PartialEq)]
pub struct ForkPage {
    /// Valid forks on this page.
    pub forks: Vec<ForkListing>,
    /// Whether another page can be requested.
    pub has_more: bool,
}

/// Result of a single request attempt.
enum Attempt {
    Response(ApiResponse),
    QuotaExhausted(Duration),
    Network(TransportError),
}

/// GitHub API client with explicit quota tracking and retry.
pub struct GitHubClient<T = OctocrabTransport, C = SystemClock> {
    transport: T,
    clock: C,
    api_base: Url,
    retry: RetryPolicy,
    quota: Mutex<QuotaTracker>,
}

impl GitHubClient<OctocrabTransport, SystemClock> {
    /// Builds a client backed by octocrab and the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] if octocrab fails to initialize.
    pub fn from_token(token: Option<&str>, options: ClientOptions) -> Result<Self, ClientError> {
        let transport = OctocrabTransport::new(token)?;
        Ok(Self::with_transport(transport, SystemClock, options))
    }
}

impl<T: Transport, C: Clock> GitHubClient<T, C> {
    /// Builds a client over any transport and clock.
    pub fn with_transport(transport: T, clock: C, options: ClientOptions) -> Self {
        let mut api_base = options.api_base;
        // `Url::join` replaces the last segment unless the path ends in '/'.
        if !api_base.path().ends_with('/') {
            let path = format!("{}/", api_base.path());
            api_base.set_path(&path);
        }

        Self {
            transport,
            clock,
            api_base,
            retry: options.retry,
            quota: Mutex::new(QuotaTracker::new(options.ceiling, options.safety_margin)),
        }
    }

    /// Current time according to the client's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Snapshot of the quota tracker.
    pub async fn quota(&self) -> QuotaTracker {
        self.quota.lock().await.clone()
    }

    /// Runs a repository search and returns one page of results.
    ///
    /// Results are sorted by stars, descending.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the page is not valid JSON.
    pub async fn search_repositories(
        &self,
        query: &str,
        page: u32,
        per_page: u8,
    ) -> Result<SearchPage, ClientError> {
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let mut url = self.api_base.join("search/repositories")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("sort", "stars")
            .append_pair("order", "desc")
            .append_pair("per_page", &per_page.to_string())
            .append_pair("page", &page.to_string());

        let response: SearchResponse = self.get_json(QuotaBucket::Search, &url).await?;
        if response.incomplete_results {
            warn!(page, "Search timed out on GitHub's side, results may be incomplete");
        }

        let raw_count = response.items.len();
        let mut items = Vec::with_capacity(raw_count);
        let mut skipped = 0;
        for value in response.items {
            match parse_repository_item(value) {
                Ok(summary) => items.push(summary),
                Err(reason) => {
                    warn!(page, reason = %reason, "Skipping malformed search item");
                    skipped += 1;
                }
            }
        }

        let reachable = response.total_count.min(MAX_SEARCH_RESULTS);
        let has_more = raw_count > 0 && u64::from(page) * u64::from(per_page) < reachable;

        Ok(SearchPage {
            items,
            total_count: response.total_count,
            has_more,
            skipped,
        })
    }

    /// Fetches the timestamp of the newest commit on the default branch.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Status`] for empty (409) or missing (404)
    /// repositories and [`ClientError::Malformed`] if no usable date exists.
    pub async fn last_commit(&self, repo: &RepoId) -> Result<DateTime<Utc>, ClientError> {
        let mut url = self
            .api_base
            .join(&format!("repos/{}/{}/commits", repo.owner(), repo.name()))?;
        url.query_pairs_mut().append_pair("per_page", "1");

        let commits: Vec<CommitItem> = self.get_json(QuotaBucket::Core, &url).await?;
        commits
            .first()
            .and_then(|item| item.commit.date())
            .ok_or_else(|| ClientError::Malformed {
                url: url.to_string(),
                message: "no commit with a date found".to_string(),
            })
    }

    /// Lists one page of forks, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the page is not a JSON array.
    pub async fn list_forks(
        &self,
        repo: &RepoId,
        page: u32,
        per_page: u8,
    ) -> Result<ForkPage, ClientError> {
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let mut url = self
            .api_base
            .join(&format!("repos/{}/{}/forks", repo.owner(), repo.name()))?;
        url.query_pairs_mut()
            .append_pair("sort", "newest")
            .append_pair("per_page", &per_page.to_string())
            .append_pair("page", &page.to_string());

        let values: Vec<serde_json::Value> = self.get_json(QuotaBucket::Core, &url).await?;
        let has_more = values.len() >= usize::from(per_page);

        let mut forks = Vec::with_capacity(values.len());
        for value in values {
            match parse_fork_item(value) {
                Ok(fork) => forks.push(fork),
                Err(reason) => warn!(repo = %repo, reason = %reason, "Skipping malformed fork"),
            }
        }

        Ok(ForkPage { forks, has_more })
    }

    /// Fetches `url` and deserializes the body.
    async fn get_json<R: DeserializeOwned>(
        &self,
        bucket: QuotaBucket,
        url: &Url,
    ) -> Result<R, ClientError> {
        let body = self.get_body(bucket, url).await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Malformed {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Fetches `url`, waiting on quota and retrying transient failures.
    async fn get_body(&self, bucket: QuotaBucket, url: &Url) -> Result<String, ClientError> {
        let mut attempt = 1;
        loop {
            let failure = match self.attempt(bucket, url).await {
                Attempt::QuotaExhausted(wait) => {
                    info!(
                        bucket = bucket.as_str(),
                        wait_secs = wait.as_secs(),
                        "Rate limit exhausted, waiting for reset"
                    );
                    self.clock.sleep(wait).await;
                    self.quota.lock().await.refresh(bucket);
                    continue;
                }
                Attempt::Network(e) => e.message,
                Attempt::Response(response) => match response.status {
                    200..=299 => return Ok(response.body),
                    401 => {
                        return Err(ClientError::Authentication {
                            status: response.status,
                            message: error_message(&response.body),
                        })
                    }
                    500..=599 => format!(
                        "server error {}: {}",
                        response.status,
                        error_message(&response.body)
                    ),
                    status => {
                        return Err(ClientError::Status {
                            url: url.to_string(),
                            status,
                            message: error_message(&response.body),
                        })
                    }
                },
            };

            if !self.retry.should_retry(attempt) {
                return Err(ClientError::Transient {
                    url: url.to_string(),
                    attempts: attempt,
                    message: failure,
                });
            }

            let delay = self.retry.delay_for(attempt);
            warn!(
                url = %url,
                attempt,
                max_attempts = self.retry.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "Transient failure, retrying"
            );
            self.clock.sleep(delay).await;
            attempt += 1;
        }
    }

    /// Sends one request while holding the quota lock.
    ///
    /// Holding the lock across the request/response pair keeps the tracker
    /// consistent with every request in flight.
    async fn attempt(&self, bucket: QuotaBucket, url: &Url) -> Attempt {
        let mut quota = self.quota.lock().await;

        if let Some(wait) = quota.wait_needed(bucket, self.clock.now()) {
            info!(
                bucket = bucket.as_str(),
                remaining = quota.window(bucket).remaining,
                wait_secs = wait.as_secs(),
                "Rate limit low, waiting for reset"
            );
            self.clock.sleep(wait).await;
            quota.refresh(bucket);
        }

        quota.note_request(bucket);
        debug!(url = %url, "GET");
        let response = match self.transport.get(url).await {
            Ok(response) => response,
            Err(e) => return Attempt::Network(e),
        };

        if let Some(info) = &response.rate_limit {
            quota.record(bucket, info);
        }

        if matches!(response.status, 403 | 429) {
            if let Some(retry_after) = response.retry_after {
                return Attempt::QuotaExhausted(Duration::from_secs(
                    retry_after.clamp(1, MAX_WAIT_SECS),
                ));
            }
            if let Some(info) = response.rate_limit.as_ref().filter(|i| i.remaining == 0) {
                if let Some(reset) = info.reset_at() {
                    quota.mark_exhausted(bucket, reset);
                }
                let wait = quota
                    .wait_needed(bucket, self.clock.now())
                    .unwrap_or(MIN_QUOTA_WAIT);
                return Attempt::QuotaExhausted(wait);
            }
        }

        Attempt::Response(response)
    }
}

fn parse_repository_item(value: serde_json::Value) -> Result<RepositorySummary, String> {
    let item: RepositoryItem = serde_json::from_value(value).map_err(|e| e.to_string())?;
    let id = RepoId::new(item.owner.login, item.name).map_err(|e| e.to_string())?;
    Ok(RepositorySummary {
        id,
        url: item.html_url,
        stars: item.stargazers_count,
        pushed_at: item.pushed_at,
        open_issues: item.open_issues_count,
    })
}

fn parse_fork_item(value: serde_json::Value) -> Result<ForkListing, String> {
    let item: ForkItem = serde_json::from_value(value).map_err(|e| e.to_string())?;
    let id = RepoId::new(item.owner.login, item.name).map_err(|e| e.to_string())?;
    Ok(ForkListing {
        id,
        url: item.html_url,
        stars: item.stargazers_count,
        pushed_at: item.pushed_at,
    })
}

/// Extracts GitHub's `message` field, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.chars().take(200).collect())
}
