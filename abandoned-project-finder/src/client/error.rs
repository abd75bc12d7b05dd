//! API client error types.

use crate::repository::RepoIdError;
use thiserror::Error;

/// Errors that can occur while talking to the GitHub API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network failure or 5xx that persisted through every retry.
    #[error("Transient failure fetching {url} after {attempts} attempts: {message}")]
    Transient {
        url: String,
        attempts: u32,
        message: String,
    },

    /// The token was rejected.
    #[error("GitHub rejected the credentials ({status}): {message}")]
    Authentication { status: u16, message: String },

    /// Non-success status that is neither transient nor an auth failure.
    #[error("GitHub returned {status} for {url}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    /// The response is missing required fields or is not valid JSON.
    #[error("Malformed response from {url}: {message}")]
    Malformed { url: String, message: String },

    /// A repository identity returned by the API is not `owner/name` shaped.
    #[error(transparent)]
    InvalidRepoId(#[from] RepoIdError),

    /// The API base URL cannot be joined with an endpoint path.
    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    /// The GitHub client could not be constructed.
    #[error("Failed to build GitHub client: {0}")]
    Build(#[from] octocrab::Error),
}

impl ClientError {
    /// Returns true if the whole run must stop.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::Build(_))
    }
}
