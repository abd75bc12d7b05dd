//! Runner error types.

use crate::client::ClientError;

/// Errors that stop a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// The candidate search failed, so there is nothing to analyse.
    #[error("Candidate search failed: {0}")]
    Search(#[source] ClientError),

    /// Fatal API errors (rejected credentials, client construction).
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The report could not be written.
    #[error(transparent)]
    Report(#[from] crate::report::ReportError),

    /// The console summary could not be rendered.
    #[error(transparent)]
    Template(#[from] crate::templates::TemplateError),
}
