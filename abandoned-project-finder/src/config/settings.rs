//! Tuning settings loaded from a TOML file.

use super::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Optional overrides read from a `--config` file.
///
/// Every key is optional; missing keys keep their defaults.
///
/// ```toml
/// language = "rust"
/// recent-days = 90
/// fork-scan-limit = 200
/// min-fork-stars = 1
/// top = 10
/// api-url = "https://github.example.com/api/v3"
/// retry-attempts = 5
/// retry-base-delay-ms = 500
/// retry-max-delay-ms = 10000
/// quota-safety-margin = 10
/// summary-template = "summary.hbs"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSettings {
    /// Language filter; an empty string searches every language.
    pub language: Option<String>,

    /// Fork activity window in days.
    pub recent_days: Option<u64>,

    /// Maximum forks inspected per repository; every fork when absent.
    pub fork_scan_limit: Option<usize>,

    /// Forks with fewer stars are ignored.
    pub min_fork_stars: Option<u64>,

    /// Candidates shown in the console summary.
    pub top: Option<usize>,

    /// GitHub API root.
    pub api_url: Option<String>,

    /// Attempts per request, including the first.
    pub retry_attempts: Option<u32>,

    /// Backoff before the first retry.
    pub retry_base_delay_ms: Option<u64>,

    /// Backoff ceiling.
    pub retry_max_delay_ms: Option<u64>,

    /// Remaining-request count that triggers a wait for reset.
    pub quota_safety_margin: Option<u32>,

    /// Handlebars template for the console summary.
    ///
    /// Relative paths are resolved against the config file's directory.
    pub summary_template: Option<PathBuf>,
}

impl FileSettings {
    /// Parses settings from TOML text. `origin` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TomlError`] on invalid TOML or unknown keys.
    pub fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlError {
            path: origin.to_string(),
            source: e,
        })
    }

    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading config file");

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let mut settings = Self::parse(&content, &path.display().to_string())?;
        if let Some(template) = settings.summary_template.take() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            settings.summary_template = Some(base.join(template));
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parses_all_keys() {
        let settings = FileSettings::parse(
            r#"
language = "rust"
recent-days = 90
fork-scan-limit = 200
min-fork-stars = 1
top = 10
api-url = "https://github.example.com/api/v3"
retry-attempts = 5
retry-base-delay-ms = 500
retry-max-delay-ms = 10000
quota-safety-margin = 10
summary-template = "summary.hbs"
"#,
            "test",
        )
        .unwrap();

        assert_eq!(settings.language.as_deref(), Some("rust"));
        assert_eq!(settings.recent_days, Some(90));
        assert_eq!(settings.fork_scan_limit, Some(200));
        assert_eq!(settings.min_fork_stars, Some(1));
        assert_eq!(settings.top, Some(10));
        assert_eq!(
            settings.api_url.as_deref(),
            Some("https://github.example.com/api/v3")
        );
        assert_eq!(settings.retry_attempts, Some(5));
        assert_eq!(settings.retry_base_delay_ms, Some(500));
        assert_eq!(settings.retry_max_delay_ms, Some(10000));
        assert_eq!(settings.quota_safety_margin, Some(10));
        assert_eq!(settings.summary_template, Some(PathBuf::from("summary.hbs")));
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let settings = FileSettings::parse("", "test").unwrap();
        assert_eq!(settings, FileSettings::default());
    }

    #[test]
    fn rejects_unknown_keys() {
        let result = FileSettings::parse("min_stars = 5", "test");
        assert!(matches!(result, Err(ConfigError::TomlError { .. })));
    }

    #[test]
    fn rejects_wrong_types() {
        let result = FileSettings::parse("top = \"five\"", "test");
        assert!(matches!(result, Err(ConfigError::TomlError { .. })));
    }

    #[test]
    fn load_resolves_template_relative_to_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("finder.toml");
        fs::write(&path, "summary-template = \"summary.hbs\"\n").unwrap();

        let settings = FileSettings::load(&path).unwrap();
        assert_eq!(
            settings.summary_template,
            Some(temp.path().join("summary.hbs"))
        );
    }

    #[test]
    fn load_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = FileSettings::load(&temp.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }
}
