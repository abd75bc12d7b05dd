//! CLI for the Abandoned Project Finder.
//!
//! Searches GitHub for popular repositories that stopped receiving commits,
//! looks for actively maintained forks, and writes a ranked CSV report.

use abandoned_project_finder::config::{
    DEFAULT_DAYS_ABANDONED, DEFAULT_MAX_RESULTS, DEFAULT_MIN_STARS,
};
use abandoned_project_finder::report::DEFAULT_OUTPUT;
use abandoned_project_finder::{
    CancelFlag, FileSettings, PipelineConfig, RunReport, RunSummary, Runner, RunnerError,
};
use clap::builder::TypedValueParser;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit status when the run was interrupted.
const EXIT_CANCELLED: u8 = 130;

/// Exit status for fatal errors.
const EXIT_FATAL: u8 = 2;

/// Abandoned Project Finder - Find popular but abandoned GitHub projects and their maintained forks.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// GitHub Personal Access Token (optional, raises rate limits).
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Minimum stargazer count.
    #[arg(long, default_value_t = DEFAULT_MIN_STARS)]
    min_stars: u64,

    /// Days without commits before a repository counts as abandoned.
    #[arg(long, default_value_t = DEFAULT_DAYS_ABANDONED)]
    days_abandoned: u64,

    /// Maximum rows in the report.
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_RESULTS,
        value_parser = clap::value_parser!(u64).range(1..).map(|v| v as usize)
    )]
    max_results: usize,

    /// CSV report destination.
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Primary language filter (empty for any) [default: python].
    #[arg(long)]
    language: Option<String>,

    /// Days within which a fork must have committed [default: 180].
    #[arg(long)]
    recent_days: Option<u64>,

    /// Candidates shown in the console summary [default: 5].
    #[arg(long)]
    top: Option<usize>,

    /// TOML file with additional tuning settings.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    init_tracing();

    // octocrab's rustls needs a process-wide crypto provider
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    // Parse arguments
    let args = Args::parse();

    let cancel = CancelFlag::new();
    spawn_interrupt_handler(cancel.clone());

    // Run the main logic
    match run(args, cancel).await {
        Ok(report) => {
            print_summary(&report.summary);
            println!("{}", report.top_summary);

            if report.summary.cancelled {
                ExitCode::from(EXIT_CANCELLED)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// First Ctrl+C stops after the current candidate, the second exits at once.
fn spawn_interrupt_handler(cancel: CancelFlag) {
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            if cancel.cancel() {
                std::process::exit(i32::from(EXIT_CANCELLED));
            }
            warn!("Interrupted, finishing current repository (Ctrl+C again to quit)");
        }
    });
}

/// Builds the pipeline configuration: CLI flags over config file over defaults.
fn build_config(args: Args) -> Result<PipelineConfig, RunnerError> {
    let mut config = PipelineConfig::new(
        args.min_stars,
        args.days_abandoned,
        args.max_results,
        args.output,
        args.token,
    );

    if let Some(path) = &args.config {
        config = config.with_file_settings(&FileSettings::load(path)?);
    }
    if let Some(language) = &args.language {
        config = config.with_language(language);
    }
    if let Some(days) = args.recent_days {
        config = config.with_recent_days(days);
    }
    if let Some(top) = args.top {
        config = config.with_top(top);
    }

    config.validate()?;
    Ok(config)
}

/// Main execution logic.
async fn run(args: Args, cancel: CancelFlag) -> Result<RunReport, RunnerError> {
    let config = build_config(args)?;
    let runner = Runner::new(config)?.with_cancel_flag(cancel);
    runner.run().await
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    if summary.cancelled {
        println!("  Status: Cancelled");
    }
    println!("  Candidates found: {}", summary.candidates_found);
    println!("  Analysed: {}", summary.analyzed);
    println!("  Abandoned: {}", summary.abandoned);
    println!("  Excluded (recently active): {}", summary.excluded);
    println!("  Skipped (errors): {}", summary.skipped);
    if summary.has_skips() {
        println!("    Reasons are in the log; rerun later to retry them.");
    }
    if summary.cancelled {
        println!("  Not reached: {}", summary.unprocessed());
    }
    println!("  Maintained forks found: {}", summary.forks_found);
    println!("  Rows written: {}", summary.rows_written);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["abandoned-project-finder-cli"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults() {
        temp_env::with_var_unset("GITHUB_TOKEN", || {
            let config = build_config(parse(&[])).unwrap();

            assert_eq!(config.min_stars(), 1000);
            assert_eq!(config.days_abandoned(), 365);
            assert_eq!(config.max_results(), 50);
            assert_eq!(config.output(), Path::new("abandoned_projects.csv"));
            assert_eq!(config.token(), None);
            assert_eq!(config.language(), Some("python"));
            assert_eq!(config.top(), 5);
        });
    }

    #[test]
    fn token_from_environment() {
        temp_env::with_var("GITHUB_TOKEN", Some("env-token"), || {
            let config = build_config(parse(&[])).unwrap();
            assert_eq!(config.token(), Some("env-token"));
        });
    }

    #[test]
    fn flag_overrides_environment_token() {
        temp_env::with_var("GITHUB_TOKEN", Some("env-token"), || {
            let config = build_config(parse(&["--token", "flag-token"])).unwrap();
            assert_eq!(config.token(), Some("flag-token"));
        });
    }

    #[test]
    fn rejects_zero_max_results() {
        let argv = ["abandoned-project-finder-cli", "--max-results", "0"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn cli_overrides_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("finder.toml");
        std::fs::write(
            &path,
            "language = \"rust\"\nrecent-days = 90\ntop = 10\nfork-scan-limit = 20\n",
        )
        .unwrap();

        temp_env::with_var_unset("GITHUB_TOKEN", || {
            let config = build_config(parse(&[
                "--config",
                path.to_str().unwrap(),
                "--recent-days",
                "30",
            ]))
            .unwrap();

            assert_eq!(config.language(), Some("rust"));
            assert_eq!(config.forks().recent_days, 30);
            assert_eq!(config.forks().scan_limit, Some(20));
            assert_eq!(config.top(), 10);
        });
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.toml");

        let result = build_config(parse(&["--config", missing.to_str().unwrap()]));
        assert!(matches!(result, Err(RunnerError::Config(_))));
    }
}
