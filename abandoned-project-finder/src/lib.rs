#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod abandonment;
pub mod client;
pub mod config;
pub mod discovery;
pub mod forks;
pub mod rate_limit;
pub mod report;
pub mod repository;
pub mod runner;
pub mod scoring;
pub mod summary;
pub mod templates;

pub use abandonment::{check_abandonment, days_between, is_abandoned, Abandonment};
pub use client::{
    ApiResponse, ClientError, ClientOptions, GitHubClient, OctocrabTransport, RetryPolicy,
    Transport, TransportError,
};
pub use config::{ConfigError, FileSettings, PipelineConfig};
pub use discovery::{find_candidates, SearchQuery};
pub use forks::{find_active_fork, ForkSettings};
pub use rate_limit::{Clock, QuotaBucket, QuotaCeiling, QuotaTracker, RateLimitInfo, SystemClock};
pub use report::{ensure_writable, rank, read_report, write_report, ReportError, ReportRow};
pub use repository::{AbandonedCandidate, MaintainedFork, RepoId, RepositorySummary};
pub use runner::{CancelFlag, RunReport, Runner, RunnerError};
pub use scoring::score;
pub use summary::{CandidateOutcome, RunSummary};
pub use templates::{create_handlebars_registry, SummaryRenderer, TemplateError};
