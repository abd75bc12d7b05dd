//! `owner/name` repository identity.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a string is not a valid `owner/name` identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid repository identity '{value}': {reason}")]
pub struct RepoIdError {
    /// The rejected input.
    pub value: String,
    /// Why it was rejected.
    pub reason: &'static str,
}

/// Identity of a GitHub repository.
///
/// Ordering compares the full `owner/name` string byte by byte, which is the
/// order every tie-break in the pipeline relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoId {
    owner: String,
    name: String,
}

impl RepoId {
    /// Creates an identity from its two halves, validating both.
    ///
    /// # Errors
    ///
    /// Returns [`RepoIdError`] if either half is empty or contains
    /// characters GitHub does not allow.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, RepoIdError> {
        let owner = owner.into();
        let name = name.into();
        let full = format!("{owner}/{name}");
        validate_segment(&owner, &full)?;
        validate_segment(&name, &full)?;
        Ok(Self { owner, name })
    }

    /// Repository owner (user or organization).
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full name in `owner/name` form.
    pub fn full_name(&self) -> String {
        self.to_string()
    }

    fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.owner
            .bytes()
            .chain(std::iter::once(b'/'))
            .chain(self.name.bytes())
    }
}

fn validate_segment(segment: &str, full: &str) -> Result<(), RepoIdError> {
    let reject = |reason| {
        Err(RepoIdError {
            value: full.to_string(),
            reason,
        })
    };

    if segment.is_empty() {
        return reject("owner and name must both be non-empty");
    }
    if segment == "." || segment == ".." {
        return reject("'.' and '..' are not repository names");
    }
    if !segment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return reject("only ASCII letters, digits, '-', '_' and '.' are allowed");
    }
    Ok(())
}

impl FromStr for RepoId {
    type Err = RepoIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) if !name.contains('/') => Self::new(owner, name),
            _ => Err(RepoIdError {
                value: s.to_string(),
                reason: "expected exactly one '/' separating owner and name",
            }),
        }
    }
}

impl TryFrom<String> for RepoId {
    type Error = RepoIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RepoId> for String {
    fn from(id: RepoId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl Ord for RepoId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes().cmp(other.bytes())
    }
}

impl PartialOrd for RepoId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
