//! In-memory GitHub API used by the pipeline tests.

#![allow(dead_code)]

use abandoned_project_finder::{
    ApiResponse, CancelFlag, Clock, ClientOptions, GitHubClient, QuotaCeiling, RateLimitInfo,
    Transport, TransportError,
};
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Fixed start of every test run.
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    start() - ChronoDuration::days(days)
}

/// Clock that advances instantly when slept on.
#[derive(Clone)]
pub struct FakeClock {
    now: Arc<Mutex<DateTime<Utc>>>,
    slept: Arc<Mutex<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(start())),
            slept: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Total time spent sleeping.
    pub fn slept(&self) -> Duration {
        *self.slept.lock().unwrap()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        *self.slept.lock().unwrap() += duration;
        *self.now.lock().unwrap() += ChronoDuration::from_std(duration).unwrap();
    }
}

#[derive(Clone)]
struct Repo {
    owner: String,
    name: String,
    stars: u64,
    open_issues: u64,
    pushed_at: DateTime<Utc>,
}

impl Repo {
    fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    fn json(&self) -> Value {
        json!({
            "name": self.name,
            "owner": { "login": self.owner },
            "html_url": format!("https://github.com/{}", self.full_name()),
            "stargazers_count": self.stars,
            "pushed_at": self.pushed_at.to_rfc3339(),
            "open_issues_count": self.open_issues,
            "fork": false,
        })
    }
}

/// Quota window of one bucket.
struct Window {
    limit: u32,
    length: ChronoDuration,
    remaining: u32,
    reset: Option<DateTime<Utc>>,
}

impl Window {
    fn new(limit: u32, length: ChronoDuration) -> Self {
        Self {
            limit,
            length,
            remaining: limit,
            reset: None,
        }
    }

    /// Consumes one request. Returns false when the window is exhausted.
    fn take(&mut self, now: DateTime<Utc>) -> bool {
        match self.reset {
            Some(reset) if now >= reset => {
                self.remaining = self.limit;
                self.reset = Some(now + self.length);
            }
            None => self.reset = Some(now + self.length),
            _ => {}
        }
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    fn info(&self, resource: &str) -> RateLimitInfo {
        RateLimitInfo {
            remaining: self.remaining,
            limit: self.limit,
            reset: self.reset.map_or(0, |r| r.timestamp() as u64),
            resource: Some(resource.to_string()),
        }
    }
}

#[derive(Default)]
struct State {
    search: Vec<Repo>,
    commits: HashMap<String, DateTime<Utc>>,
    forks: HashMap<String, Vec<Repo>>,
    statuses: HashMap<String, u16>,
    requests: Vec<String>,
    rejected: usize,
    windows: HashMap<&'static str, Window>,
    cancel_on: Option<(String, CancelFlag)>,
}

/// Routes search, commit and fork requests to canned data.
///
/// Optionally enforces a quota per bucket, answering 403 with exhausted
/// `x-ratelimit-*` headers until the window resets.
#[derive(Clone)]
pub struct FakeGitHub {
    clock: FakeClock,
    state: Arc<Mutex<State>>,
}

impl FakeGitHub {
    pub fn new(clock: FakeClock) -> Self {
        Self {
            clock,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Adds a search result whose newest commit is `last_commit`.
    pub fn repo(
        self,
        full_name: &str,
        stars: u64,
        open_issues: u64,
        last_commit: DateTime<Utc>,
    ) -> Self {
        let repo = repo(full_name, stars, open_issues, last_commit);
        {
            let mut state = self.state.lock().unwrap();
            state.commits.insert(full_name.to_string(), last_commit);
            state.search.push(repo);
        }
        self
    }

    /// Repeats an existing search result under a different star count, as
    /// GitHub does when a repository moves between pages mid-search.
    pub fn search_duplicate(self, full_name: &str, stars: u64) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let mut copy = state
                .search
                .iter()
                .find(|repo| repo.full_name() == full_name)
                .cloned()
                .unwrap();
            copy.stars = stars;
            state.search.push(copy);
        }
        self
    }

    /// Adds a fork of `parent` whose newest commit is `last_commit`.
    pub fn fork(self, parent: &str, full_name: &str, last_commit: DateTime<Utc>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.commits.insert(full_name.to_string(), last_commit);
            state
                .forks
                .entry(parent.to_string())
                .or_default()
                .push(repo(full_name, 0, 0, last_commit));
        }
        self
    }

    /// Answers every request under `/repos/{full_name}/` with `status`.
    pub fn status_for(self, full_name: &str, status: u16) -> Self {
        self.state
            .lock()
            .unwrap()
            .statuses
            .insert(full_name.to_string(), status);
        self
    }

    /// Limits the core bucket to `limit` requests per `window`.
    pub fn core_quota(self, limit: u32, window: ChronoDuration) -> Self {
        self.state
            .lock()
            .unwrap()
            .windows
            .insert("core", Window::new(limit, window));
        self
    }

    /// Sets `flag` when the commits of `full_name` are requested.
    pub fn cancel_on_commits(self, full_name: &str, flag: CancelFlag) -> Self {
        self.state.lock().unwrap().cancel_on = Some((full_name.to_string(), flag));
        self
    }

    /// Paths of every request received, quota rejections included.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Number of requests received for `path`.
    pub fn count(&self, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|requested| *requested == path)
            .count()
    }

    /// Requests answered with an exhausted quota.
    pub fn rejected(&self) -> usize {
        self.state.lock().unwrap().rejected
    }

    fn respond(&self, url: &Url) -> ApiResponse {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap();
        state.requests.push(url.path().to_string());

        let path = url.path().trim_start_matches('/');
        let resource = if path.starts_with("search/") {
            "search"
        } else {
            "core"
        };

        let mut rate_limit = None;
        if let Some(window) = state.windows.get_mut(resource) {
            let allowed = window.take(now);
            let info = window.info(resource);
            if !allowed {
                state.rejected += 1;
                return ApiResponse {
                    status: 403,
                    rate_limit: Some(info),
                    retry_after: None,
                    body: json!({ "message": "API rate limit exceeded" }).to_string(),
                };
            }
            rate_limit = Some(info);
        }

        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
        let per_page: usize = query
            .get("per_page")
            .and_then(|p| p.parse().ok())
            .unwrap_or(30);

        let (status, body) = if path == "search/repositories" {
            let mut items = state.search.clone();
            items.sort_by(|a, b| b.stars.cmp(&a.stars));
            let total = items.len();
            let page_items: Vec<Value> = items
                .iter()
                .skip((page - 1) * per_page)
                .take(per_page)
                .map(Repo::json)
                .collect();
            (
                200,
                json!({
                    "total_count": total,
                    "incomplete_results": false,
                    "items": page_items,
                }),
            )
        } else if let Some(rest) = path.strip_prefix("repos/") {
            let mut parts = rest.splitn(3, '/');
            let full_name = format!(
                "{}/{}",
                parts.next().unwrap_or_default(),
                parts.next().unwrap_or_default()
            );
            let endpoint = parts.next().unwrap_or_default();

            if let Some(status) = state.statuses.get(&full_name) {
                (*status, json!({ "message": format!("status {status}") }))
            } else if endpoint == "commits" {
                if let Some((target, flag)) = &state.cancel_on {
                    if *target == full_name {
                        flag.cancel();
                    }
                }
                match state.commits.get(&full_name) {
                    Some(date) => (
                        200,
                        json!([{
                            "sha": "0123456789abcdef",
                            "commit": {
                                "author": { "date": date.to_rfc3339() },
                                "committer": { "date": date.to_rfc3339() },
                            },
                        }]),
                    ),
                    None => (409, json!({ "message": "Git Repository is empty." })),
                }
            } else if endpoint == "forks" {
                let forks = state.forks.get(&full_name).cloned().unwrap_or_default();
                let page_items: Vec<Value> = forks
                    .iter()
                    .skip((page - 1) * per_page)
                    .take(per_page)
                    .map(Repo::json)
                    .collect();
                (200, Value::Array(page_items))
            } else {
                (404, json!({ "message": "Not Found" }))
            }
        } else {
            (404, json!({ "message": "Not Found" }))
        };

        ApiResponse {
            status,
            rate_limit,
            retry_after: None,
            body: body.to_string(),
        }
    }
}

impl Transport for FakeGitHub {
    async fn get(&self, url: &Url) -> Result<ApiResponse, TransportError> {
        Ok(self.respond(url))
    }
}

fn repo(full_name: &str, stars: u64, open_issues: u64, pushed_at: DateTime<Utc>) -> Repo {
    let (owner, name) = full_name.split_once('/').unwrap();
    Repo {
        owner: owner.to_string(),
        name: name.to_string(),
        stars,
        open_issues,
        pushed_at,
    }
}

/// Client over `github` with authenticated ceilings and the given margin.
pub fn client(
    github: &FakeGitHub,
    clock: &FakeClock,
    safety_margin: u32,
) -> GitHubClient<FakeGitHub, FakeClock> {
    let mut options = ClientOptions::new(
        Url::parse("https://api.github.com").unwrap(),
        QuotaCeiling::AUTHENTICATED,
    );
    options.safety_margin = safety_margin;
    GitHubClient::with_transport(github.clone(), clock.clone(), options)
}
