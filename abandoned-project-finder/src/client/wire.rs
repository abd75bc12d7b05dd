//! GitHub JSON payloads.
//!
//! Required fields are non-optional so that deserialization doubles as
//! validation.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Owner {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryItem {
    pub name: String,
    pub owner: Owner,
    pub html_url: String,
    pub stargazers_count: u64,
    pub pushed_at: DateTime<Utc>,
    pub open_issues_count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForkItem {
    pub name: String,
    pub owner: Owner,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u64,
    pub pushed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitItem {
    pub commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitDetail {
    pub author: Option<Signature>,
    pub committer: Option<Signature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Signature {
    pub date: DateTime<Utc>,
}

impl CommitDetail {
    /// Committer date, falling back to the author date.
    ///
    /// Rebased or cherry-picked work carries an old author date but a fresh
    /// committer date.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.committer
            .as_ref()
            .or(self.author.as_ref())
            .map(|signature| signature.date)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}
