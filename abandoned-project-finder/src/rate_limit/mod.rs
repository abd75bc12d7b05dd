//! Rate limiting for the GitHub API.
//!
//! GitHub reports quota state on every response through the
//! `x-ratelimit-*` headers. [`QuotaTracker`] keeps the latest window for each
//! bucket the finder uses and tells the client how long to sleep before the
//! next request, so the pipeline blocks on quota instead of failing.

mod clock;
mod info;

pub use clock::{Clock, SystemClock};
pub use info::RateLimitInfo;

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::warn;

/// Maximum time to wait for rate limit reset (1 hour).
pub const MAX_WAIT_SECS: u64 = 3600;

/// Default number of remaining requests below which we proactively wait.
pub const DEFAULT_SAFETY_MARGIN: u32 = 5;

/// Rate limit buckets used by the finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuotaBucket {
    /// `/search/*` endpoints.
    Search,
    /// Everything else (commits, forks).
    Core,
}

impl QuotaBucket {
    /// Maps the `x-ratelimit-resource` header value to a bucket.
    pub fn from_resource(resource: &str) -> Option<Self> {
        match resource {
            "search" => Some(Self::Search),
            "core" => Some(Self::Core),
            _ => None,
        }
    }

    /// Header name of this bucket.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Core => "core",
        }
    }
}

/// Per-window request ceilings.
///
/// Unauthenticated clients get far smaller windows; the tracking logic is the
/// same for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaCeiling {
    /// Core requests per hour.
    pub core: u32,
    /// Search requests per minute.
    pub search: u32,
}

impl QuotaCeiling {
    /// Ceiling for token-authenticated requests.
    pub const AUTHENTICATED: Self = Self {
        core: 5000,
        search: 30,
    };

    /// Ceiling for anonymous requests.
    pub const UNAUTHENTICATED: Self = Self {
        core: 60,
        search: 10,
    };

    /// Picks the ceiling matching whether a token is configured.
    pub fn for_token(token: Option<&str>) -> Self {
        if token.is_some() {
            Self::AUTHENTICATED
        } else {
            Self::UNAUTHENTICATED
        }
    }
}

/// Quota state of a single bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaWindow {
    /// Requests remaining in the current window.
    pub remaining: u32,
    /// Total requests allowed per window.
    pub limit: u32,
    /// When the window resets; unknown until the first response arrives.
    pub reset: Option<DateTime<Utc>>,
}

impl QuotaWindow {
    fn fresh(limit: u32) -> Self {
        Self {
            remaining: limit,
            limit,
            reset: None,
        }
    }
}

/// Tracks the remaining quota of every bucket.
#[derive(Debug, Clone)]
pub struct QuotaTracker {
    search: QuotaWindow,
    core: QuotaWindow,
    safety_margin: u32,
}

impl QuotaTracker {
    /// Creates a tracker starting from the given ceilings.
    pub fn new(ceiling: QuotaCeiling, safety_margin: u32) -> Self {
        Self {
            search: QuotaWindow::fresh(ceiling.search),
            core: QuotaWindow::fresh(ceiling.core),
            safety_margin,
        }
    }

    /// Returns the current window of a bucket.
    pub fn window(&self, bucket: QuotaBucket) -> &QuotaWindow {
        match bucket {
            QuotaBucket::Search => &self.search,
            QuotaBucket::Core => &self.core,
        }
    }

    fn window_mut(&mut self, bucket: QuotaBucket) -> &mut QuotaWindow {
        match bucket {
            QuotaBucket::Search => &mut self.search,
            QuotaBucket::Core => &mut self.core,
        }
    }

    /// Margin actually applied to a bucket.
    ///
    /// Never more than half the window, so small anonymous windows still make
    /// progress.
    fn effective_margin(&self, bucket: QuotaBucket) -> u32 {
        self.safety_margin.min(self.window(bucket).limit / 2)
    }

    /// Counts a request that is about to be sent.
    pub fn note_request(&mut self, bucket: QuotaBucket) {
        let window = self.window_mut(bucket);
        window.remaining = window.remaining.saturating_sub(1);
    }

    /// Stores the authoritative quota state from a response.
    pub fn record(&mut self, bucket: QuotaBucket, info: &RateLimitInfo) {
        let bucket = info
            .resource
            .as_deref()
            .and_then(QuotaBucket::from_resource)
            .unwrap_or(bucket);
        let window = self.window_mut(bucket);
        window.remaining = info.remaining;
        window.limit = info.limit;
        window.reset = info.reset_at();
    }

    /// Marks a bucket as exhausted until `reset`.
    pub fn mark_exhausted(&mut self, bucket: QuotaBucket, reset: DateTime<Utc>) {
        let window = self.window_mut(bucket);
        window.remaining = 0;
        window.reset = Some(reset);
    }

    /// Resets a bucket to a full window after its reset instant has passed.
    pub fn refresh(&mut self, bucket: QuotaBucket) {
        let window = self.window_mut(bucket);
        window.remaining = window.limit;
        window.reset = None;
    }

    /// Returns how long to sleep before the next request on `bucket`.
    ///
    /// `None` means the request may go out now: either enough quota remains,
    /// or the reset instant is unknown or already behind us.
    pub fn wait_needed(&self, bucket: QuotaBucket, now: DateTime<Utc>) -> Option<Duration> {
        let window = self.window(bucket);
        if window.remaining >= self.effective_margin(bucket) && window.remaining > 0 {
            return None;
        }

        let reset = window.reset?;
        if reset <= now {
            return None;
        }

        let wait_secs = u64::try_from((reset - now).num_seconds())
            .unwrap_or(0)
            // Round up: the reset header has second precision.
            .saturating_add(1);
        if wait_secs > MAX_WAIT_SECS {
            warn!(
                wait_secs,
                max_wait = MAX_WAIT_SECS,
                "Rate limit reset too far in future, capping wait time"
            );
        }
        Some(Duration::from_secs(wait_secs.min(MAX_WAIT_SECS)))
    }
}
