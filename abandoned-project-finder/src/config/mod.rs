//! Pipeline configuration.
//!
//! [`PipelineConfig`] is assembled once from command-line values and an
//! optional TOML file (see [`FileSettings`]), validated, and then only read.

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::FileSettings;

use crate::client::{ClientOptions, RetryPolicy, DEFAULT_API_URL};
use crate::forks::ForkSettings;
use crate::rate_limit::{QuotaCeiling, DEFAULT_SAFETY_MARGIN};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Default minimum stargazer count.
pub const DEFAULT_MIN_STARS: u64 = 1000;

/// Default inactivity threshold in days.
pub const DEFAULT_DAYS_ABANDONED: u64 = 365;

/// Default report row cap.
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Default language filter.
pub const DEFAULT_LANGUAGE: &str = "python";

/// Default number of candidates in the console summary.
pub const DEFAULT_TOP: usize = 5;

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    min_stars: u64,
    days_abandoned: u64,
    max_results: usize,
    output: PathBuf,
    token: Option<String>,
    language: Option<String>,
    forks: ForkSettings,
    top: usize,
    api_url: String,
    retry: RetryPolicy,
    quota_safety_margin: u32,
    summary_template: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_MIN_STARS,
            DEFAULT_DAYS_ABANDONED,
            DEFAULT_MAX_RESULTS,
            PathBuf::from(crate::report::DEFAULT_OUTPUT),
            None,
        )
    }
}

impl PipelineConfig {
    /// Creates a configuration from the primary settings.
    ///
    /// Blank tokens are treated as absent.
    pub fn new(
        min_stars: u64,
        days_abandoned: u64,
        max_results: usize,
        output: PathBuf,
        token: Option<String>,
    ) -> Self {
        Self {
            min_stars,
            days_abandoned,
            max_results,
            output,
            token: token.filter(|t| !t.trim().is_empty()),
            language: Some(DEFAULT_LANGUAGE.to_string()),
            forks: ForkSettings::default(),
            top: DEFAULT_TOP,
            api_url: DEFAULT_API_URL.to_string(),
            retry: RetryPolicy::default(),
            quota_safety_margin: DEFAULT_SAFETY_MARGIN,
            summary_template: None,
        }
    }

    /// Overlays every key present in `settings`.
    #[must_use]
    pub fn with_file_settings(mut self, settings: &FileSettings) -> Self {
        if let Some(language) = &settings.language {
            self = self.with_language(language);
        }
        if let Some(days) = settings.recent_days {
            self.forks.recent_days = days;
        }
        if let Some(limit) = settings.fork_scan_limit {
            self.forks.scan_limit = Some(limit);
        }
        if let Some(stars) = settings.min_fork_stars {
            self.forks.min_stars = stars;
        }
        if let Some(top) = settings.top {
            self.top = top;
        }
        if let Some(api_url) = &settings.api_url {
            self.api_url.clone_from(api_url);
        }
        if let Some(attempts) = settings.retry_attempts {
            self.retry.max_attempts = attempts;
        }
        if let Some(ms) = settings.retry_base_delay_ms {
            self.retry.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = settings.retry_max_delay_ms {
            self.retry.max_delay = Duration::from_millis(ms);
        }
        if let Some(margin) = settings.quota_safety_margin {
            self.quota_safety_margin = margin;
        }
        if let Some(template) = &settings.summary_template {
            self.summary_template = Some(template.clone());
        }
        self
    }

    /// Sets the language filter. Empty means every language.
    #[must_use]
    pub fn with_language(mut self, language: &str) -> Self {
        let language = language.trim();
        self.language = (!language.is_empty()).then(|| language.to_string());
        self
    }

    /// Sets the fork activity window.
    #[must_use]
    pub fn with_recent_days(mut self, days: u64) -> Self {
        self.forks.recent_days = days;
        self
    }

    /// Sets the number of candidates in the console summary.
    #[must_use]
    pub fn with_top(mut self, top: usize) -> Self {
        self.top = top;
        self
    }

    /// Sets the GitHub API root.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Checks every setting, returning the first violation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] or [`ConfigError::InvalidUrl`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_results == 0 {
            return Err(invalid("max-results", "must be at least 1"));
        }
        if self.output.as_os_str().is_empty() {
            return Err(invalid("output", "must not be empty"));
        }
        if self.output.is_dir() {
            return Err(invalid("output", "is a directory"));
        }
        if self.forks.scan_limit == Some(0) {
            return Err(invalid("fork-scan-limit", "must be at least 1"));
        }
        if self.top == 0 {
            return Err(invalid("top", "must be at least 1"));
        }
        if self.retry.max_attempts == 0 {
            return Err(invalid("retry-attempts", "must be at least 1"));
        }
        if self.retry.base_delay > self.retry.max_delay {
            return Err(invalid(
                "retry-base-delay-ms",
                "must not exceed retry-max-delay-ms",
            ));
        }
        self.parsed_api_url().map(|_| ())
    }

    /// Client settings derived from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the API URL is not a valid http(s) URL.
    pub fn client_options(&self) -> Result<ClientOptions, ConfigError> {
        let mut options = ClientOptions::new(
            self.parsed_api_url()?,
            QuotaCeiling::for_token(self.token()),
        );
        options.retry = self.retry.clone();
        options.safety_margin = self.quota_safety_margin;
        Ok(options)
    }

    fn parsed_api_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.api_url).map_err(|e| ConfigError::InvalidUrl {
            value: self.api_url.clone(),
            source: e,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("api-url", "must be an http or https URL"));
        }
        Ok(url)
    }

    /// Minimum stargazer count.
    pub fn min_stars(&self) -> u64 {
        self.min_stars
    }

    /// Inactivity threshold in days.
    pub fn days_abandoned(&self) -> u64 {
        self.days_abandoned
    }

    /// Report row cap.
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Report destination.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// GitHub token, if one was supplied.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Language filter, `None` for every language.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Fork discovery settings.
    pub fn forks(&self) -> &ForkSettings {
        &self.forks
    }

    /// Candidates shown in the console summary.
    pub fn top(&self) -> usize {
        self.top
    }

    /// GitHub API root as configured.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Retry policy for transient failures.
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Remaining-request count that triggers a wait for reset.
    pub fn quota_safety_margin(&self) -> u32 {
        self.quota_safety_margin
    }

    /// Custom summary template path.
    pub fn summary_template(&self) -> Option<&Path> {
        self.summary_template.as_deref()
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = PipelineConfig::default();

        assert_eq!(config.min_stars(), 1000);
        assert_eq!(config.days_abandoned(), 365);
        assert_eq!(config.max_results(), 50);
        assert_eq!(config.output(), Path::new("abandoned_projects.csv"));
        assert_eq!(config.token(), None);
        assert_eq!(config.language(), Some("python"));
        assert_eq!(config.forks().recent_days, 180);
        assert_eq!(config.forks().scan_limit, None);
        assert_eq!(config.forks().min_stars, 0);
        assert_eq!(config.top(), 5);
        assert_eq!(config.api_url(), "https://api.github.com");
        assert_eq!(config.retry(), &RetryPolicy::default());
        assert_eq!(config.quota_safety_margin(), 5);
        assert!(config.summary_template().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_token_is_absent() {
        let config = PipelineConfig::new(1, 1, 1, PathBuf::from("out.csv"), Some("  ".into()));
        assert_eq!(config.token(), None);

        let config = PipelineConfig::new(1, 1, 1, PathBuf::from("out.csv"), Some("abc".into()));
        assert_eq!(config.token(), Some("abc"));
    }

    #[test]
    fn rejects_zero_max_results() {
        let config = PipelineConfig::new(1000, 365, 0, PathBuf::from("out.csv"), None);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { field, .. }) if field == "max-results"
        ));
    }

    #[test]
    fn rejects_directory_output() {
        let temp = TempDir::new().unwrap();
        let config = PipelineConfig::new(1000, 365, 10, temp.path().to_path_buf(), None);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { field, .. }) if field == "output"
        ));
    }

    #[test]
    fn rejects_bad_api_url() {
        let config = PipelineConfig::default().with_api_url("not a url");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));

        let config = PipelineConfig::default().with_api_url("ftp://example.com");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { field, .. }) if field == "api-url"
        ));
    }

    #[test]
    fn rejects_zero_fork_scan_limit() {
        let settings = FileSettings {
            fork_scan_limit: Some(0),
            ..FileSettings::default()
        };
        let config = PipelineConfig::default().with_file_settings(&settings);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { field, .. }) if field == "fork-scan-limit"
        ));
    }

    #[test]
    fn rejects_inverted_retry_delays() {
        let settings = FileSettings {
            retry_base_delay_ms: Some(5000),
            retry_max_delay_ms: Some(100),
            ..FileSettings::default()
        };
        let config = PipelineConfig::default().with_file_settings(&settings);
        assert!(config.validate().is_err());
    }

    #[test]
    fn file_settings_override_defaults() {
        let settings = FileSettings {
            language: Some("rust".into()),
            recent_days: Some(90),
            fork_scan_limit: Some(20),
            min_fork_stars: Some(3),
            top: Some(10),
            api_url: Some("https://github.example.com/api/v3".into()),
            retry_attempts: Some(5),
            retry_base_delay_ms: Some(200),
            retry_max_delay_ms: Some(2000),
            quota_safety_margin: Some(0),
            summary_template: Some(PathBuf::from("summary.hbs")),
        };
        let config = PipelineConfig::default().with_file_settings(&settings);

        assert_eq!(config.language(), Some("rust"));
        assert_eq!(
            config.forks(),
            &ForkSettings {
                recent_days: 90,
                scan_limit: Some(20),
                min_stars: 3
            }
        );
        assert_eq!(config.top(), 10);
        assert_eq!(config.retry().max_attempts, 5);
        assert_eq!(config.retry().base_delay, Duration::from_millis(200));
        assert_eq!(config.retry().max_delay, Duration::from_millis(2000));
        assert_eq!(config.quota_safety_margin(), 0);
        assert_eq!(config.summary_template(), Some(Path::new("summary.hbs")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn explicit_values_after_file_win() {
        let settings = FileSettings {
            language: Some("rust".into()),
            recent_days: Some(90),
            top: Some(10),
            ..FileSettings::default()
        };
        let config = PipelineConfig::default()
            .with_file_settings(&settings)
            .with_language("go")
            .with_recent_days(30)
            .with_top(3);

        assert_eq!(config.language(), Some("go"));
        assert_eq!(config.forks().recent_days, 30);
        assert_eq!(config.top(), 3);
    }

    #[test]
    fn empty_language_means_any() {
        let config = PipelineConfig::default().with_language("");
        assert_eq!(config.language(), None);
    }

    #[test]
    fn client_options_follow_token() {
        let config = PipelineConfig::new(1, 1, 1, PathBuf::from("o.csv"), Some("t".into()));
        let options = config.client_options().unwrap();
        assert_eq!(options.ceiling, QuotaCeiling::AUTHENTICATED);
        assert_eq!(options.safety_margin, 5);

        let options = PipelineConfig::default().client_options().unwrap();
        assert_eq!(options.ceiling, QuotaCeiling::UNAUTHENTICATED);
    }
}
