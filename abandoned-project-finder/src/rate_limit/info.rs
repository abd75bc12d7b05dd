//! Rate limit information.

use chrono::{DateTime, Utc};

/// Rate limit information for a specific resource, as reported by GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,

    /// Unix timestamp when the rate limit resets.
    pub reset: u64,

    /// Total requests allowed per window.
    pub limit: u32,

    /// Bucket the numbers apply to (`core`, `search`, ...).
    pub resource: Option<String>,
}

impl RateLimitInfo {
    /// Builds the info from raw `x-ratelimit-*` header values.
    ///
    /// Returns `None` unless remaining, limit and reset are all present and
    /// numeric.
    pub fn from_headers(
        remaining: Option<&str>,
        limit: Option<&str>,
        reset: Option<&str>,
        resource: Option<&str>,
    ) -> Option<Self> {
        Some(Self {
            remaining: remaining?.trim().parse().ok()?,
            limit: limit?.trim().parse().ok()?,
            reset: reset?.trim().parse().ok()?,
            resource: resource.map(|r| r.trim().to_string()),
        })
    }

    /// Reset instant as a timestamp.
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.reset)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}
