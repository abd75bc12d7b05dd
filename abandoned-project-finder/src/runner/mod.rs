//! Orchestrates a full abandoned-project scan.
//!
//! Candidate search, abandonment check, fork discovery, scoring and report
//! writing run in that order, one candidate at a time, through a single
//! rate-limited client.

mod cancel;
mod error;

pub use cancel::CancelFlag;
pub use error::RunnerError;

use crate::abandonment::{check_abandonment, Abandonment};
use crate::client::{ClientError, GitHubClient, OctocrabTransport, Transport};
use crate::config::PipelineConfig;
use crate::discovery::{find_candidates, SearchQuery};
use crate::forks::find_active_fork;
use crate::rate_limit::{Clock, QuotaBucket, SystemClock};
use crate::report::{dump_rows, ensure_writable, rank, write_report, ReportRow};
use crate::repository::{AbandonedCandidate, RepoId, RepositorySummary};
use crate::scoring::score;
use crate::summary::{CandidateOutcome, RunSummary};
use crate::templates::SummaryRenderer;
use chrono::{DateTime, Utc};
use tracing::{debug, info, info_span, warn, Instrument};

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Reported candidates, ranked.
    pub candidates: Vec<AbandonedCandidate>,
    /// Counters for the run.
    pub summary: RunSummary,
    /// Rendered top-N console summary.
    pub top_summary: String,
}

/// Runs the pipeline for one configuration.
pub struct Runner<T = OctocrabTransport, C = SystemClock> {
    config: PipelineConfig,
    client: GitHubClient<T, C>,
    renderer: SummaryRenderer,
    cancel: CancelFlag,
}

impl Runner<OctocrabTransport, SystemClock> {
    /// Builds a runner talking to GitHub through octocrab.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if the configuration is invalid, the summary
    /// template does not load, or the client cannot be built.
    pub fn new(config: PipelineConfig) -> Result<Self, RunnerError> {
        config.validate()?;
        let client = GitHubClient::from_token(config.token(), config.client_options()?)?;
        Self::with_client(config, client)
    }
}

impl<T: Transport, C: Clock> Runner<T, C> {
    /// Builds a runner over an existing client.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if the configuration is invalid or the summary
    /// template does not load.
    pub fn with_client(
        config: PipelineConfig,
        client: GitHubClient<T, C>,
    ) -> Result<Self, RunnerError> {
        config.validate()?;
        let renderer = match config.summary_template() {
            Some(path) => SummaryRenderer::from_file(path)?,
            None => SummaryRenderer::new()?,
        };

        Ok(Self {
            config,
            client,
            renderer,
            cancel: CancelFlag::new(),
        })
    }

    /// Uses `cancel` as the stop request for this runner.
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle that stops the run after the current candidate.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Executes the full pipeline and writes the report.
    ///
    /// On cancellation the candidates processed so far are still ranked and
    /// written, and the summary is marked cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when the output is unwritable, the search
    /// fails, credentials are rejected, or the summary fails to render.
    pub async fn run(&self) -> Result<RunReport, RunnerError> {
        let output = self.config.output();
        ensure_writable(output)?;

        if self.config.token().is_none() {
            warn!("No GitHub token supplied, running with unauthenticated rate limits");
        }

        let as_of = self.client.now();
        let query = SearchQuery::new(self.config.min_stars())
            .with_language(self.config.language())
            .inactive_for(self.config.days_abandoned(), as_of);

        info!(
            query = %query.to_query_string(),
            as_of = %as_of,
            output = %output.display(),
            "Starting scan"
        );

        let repositories = find_candidates(&self.client, &query, self.config.max_results())
            .await
            .map_err(RunnerError::Search)?;

        let total = repositories.len();
        let mut summary = RunSummary::new(total);
        let mut candidates = Vec::new();

        for (index, repository) in repositories.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(
                    processed = index,
                    total, "Cancellation requested, writing partial report"
                );
                summary.cancelled = true;
                break;
            }

            let id = repository.id.clone();
            let stars = repository.stars;
            let outcome = self
                .process_candidate(repository, as_of)
                .instrument(info_span!("candidate", repo = %id))
                .await?;

            log_progress(index + 1, total, stars, &outcome);
            summary.record_result(&outcome);
            if let CandidateOutcome::Reported(candidate) = outcome {
                candidates.push(*candidate);
            }
        }

        rank(&mut candidates);
        let rows: Vec<ReportRow> = candidates.iter().map(ReportRow::from).collect();
        if let Err(e) = write_report(&rows, output) {
            dump_rows(&rows);
            return Err(e.into());
        }
        summary.rows_written = rows.len();

        let quota = self.client.quota().await;
        info!(
            analyzed = summary.analyzed,
            excluded = summary.excluded,
            skipped = summary.skipped,
            cancelled = summary.cancelled,
            core_remaining = quota.window(QuotaBucket::Core).remaining,
            search_remaining = quota.window(QuotaBucket::Search).remaining,
            "Scan complete"
        );

        let top_summary = self.renderer.render_top(&candidates, self.config.top())?;
        Ok(RunReport {
            candidates,
            summary,
            top_summary,
        })
    }

    async fn process_candidate(
        &self,
        repository: RepositorySummary,
        as_of: DateTime<Utc>,
    ) -> Result<CandidateOutcome, RunnerError> {
        let id = repository.id.clone();

        let candidate =
            match check_abandonment(&self.client, repository, self.config.days_abandoned(), as_of)
                .await
            {
                Ok(Abandonment::Abandoned(candidate)) => candidate,
                Ok(Abandonment::Active {
                    repository,
                    days_since_last_commit,
                }) => {
                    debug!(days = days_since_last_commit, "Recently active, excluded");
                    return Ok(CandidateOutcome::Excluded {
                        repository: repository.id,
                        days_since_last_commit,
                    });
                }
                Err(e) => return skip_or_abort(id, "abandonment check", e),
            };

        let fork = match find_active_fork(&self.client, &id, self.config.forks(), as_of).await {
            Ok(fork) => fork,
            Err(e) => return skip_or_abort(id, "fork discovery", e),
        };

        let candidate = candidate.with_fork(fork);
        let value = score(
            candidate.repository.stars,
            candidate.days_since_last_commit,
            candidate.repository.open_issues,
        );
        Ok(CandidateOutcome::Reported(Box::new(candidate.with_score(value))))
    }
}

fn skip_or_abort(
    repository: RepoId,
    stage: &str,
    error: ClientError,
) -> Result<CandidateOutcome, RunnerError> {
    if error.is_fatal() {
        return Err(error.into());
    }

    warn!(repo = %repository, stage, error = %error, "Skipping repository");
    Ok(CandidateOutcome::Skipped {
        repository,
        reason: format!("{stage}: {error}"),
    })
}

fn log_progress(index: usize, total: usize, stars: u64, outcome: &CandidateOutcome) {
    let repo = outcome.repository();
    match outcome {
        CandidateOutcome::Reported(candidate) => {
            let fork = candidate
                .active_fork
                .as_ref()
                .map_or_else(|| "none".to_string(), |f| f.id.to_string());
            info!(
                index,
                total,
                repo = %repo,
                stars,
                days_abandoned = candidate.days_since_last_commit,
                fork = %fork,
                "Abandoned"
            );
        }
        CandidateOutcome::Excluded {
            days_since_last_commit,
            ..
        } => info!(
            index,
            total,
            repo = %repo,
            stars,
            days_since_last_commit,
            "Active"
        ),
        CandidateOutcome::Skipped { reason, .. } => {
            info!(index, total, repo = %repo, stars, reason = %reason, "Skipped");
        }
    }
}
