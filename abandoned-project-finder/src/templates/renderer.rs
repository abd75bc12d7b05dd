//! Summary renderer.

use super::{format_thousands, TemplateError};
use crate::repository::AbandonedCandidate;
use handlebars::{no_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde_json::{json, Value};
use std::path::Path;

const SUMMARY_TEMPLATE_NAME: &str = "summary";

/// Built-in top-N summary template.
pub const DEFAULT_SUMMARY_TEMPLATE: &str = "\
{{#if candidates}}
Top {{count}} candidates:
{{#each candidates}}
{{rank}}. {{full_name}}
   Stars: {{stars}} | Abandoned: {{days_abandoned}} days | Score: {{score}}
{{#if (eq fork_status \"found\")}}
   Active fork: {{fork_name}} (last commit {{fork_last_commit}})
{{/if}}
{{/each}}
{{else}}
No abandoned projects found.
{{/if}}
";

/// Creates a configured Handlebars registry with custom helpers.
///
/// The registry is configured with:
/// - No HTML escaping (for terminal output)
/// - Strict mode (catches missing variables)
/// - `eq` helper for equality comparisons
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs.register_helper("eq", Box::new(eq_helper));
    hbs
}

/// Helper function for equality comparison in templates.
///
/// Usage: `{{#if (eq variable "value")}}...{{/if}}`
fn eq_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param1 = h.param(0).and_then(|v| v.value().as_str());
    let param2 = h.param(1).and_then(|v| v.value().as_str());

    let result = match (param1, param2) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };

    out.write(if result { "true" } else { "" })?;
    Ok(())
}

/// Renders the human-readable top-N summary of a run.
pub struct SummaryRenderer {
    handlebars: Handlebars<'static>,
}

impl SummaryRenderer {
    /// Creates a renderer using [`DEFAULT_SUMMARY_TEMPLATE`].
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in template fails to register.
    pub fn new() -> Result<Self, TemplateError> {
        Self::with_template(DEFAULT_SUMMARY_TEMPLATE)
    }

    /// Creates a renderer from template source.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::RegistrationError`] if the template does not parse.
    pub fn with_template(template: &str) -> Result<Self, TemplateError> {
        let mut handlebars = create_handlebars_registry();
        handlebars.register_template_string(SUMMARY_TEMPLATE_NAME, template)?;
        Ok(Self { handlebars })
    }

    /// Creates a renderer from a template file.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if the file cannot be read or does not parse.
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let template = std::fs::read_to_string(path).map_err(|e| TemplateError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::with_template(&template)
    }

    /// Renders the first `top` of the already ranked `candidates`.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_top(
        &self,
        candidates: &[AbandonedCandidate],
        top: usize,
    ) -> Result<String, TemplateError> {
        let entries: Vec<Value> = candidates
            .iter()
            .take(top)
            .enumerate()
            .map(|(i, candidate)| summary_entry(i + 1, candidate))
            .collect();

        let data = json!({
            "count": entries.len(),
            "total": candidates.len(),
            "candidates": entries,
        });

        Ok(self.handlebars.render(SUMMARY_TEMPLATE_NAME, &data)?)
    }
}

fn summary_entry(rank: usize, candidate: &AbandonedCandidate) -> Value {
    let repository = &candidate.repository;
    let fork = candidate.active_fork.as_ref();

    json!({
        "rank": rank,
        "full_name": repository.id.full_name(),
        "url": repository.url,
        "stars": format_thousands(repository.stars),
        "days_abandoned": candidate.days_since_last_commit,
        "open_issues": repository.open_issues,
        "score": format!("{:.4}", candidate.score),
        "fork_status": if fork.is_some() { "found" } else { "none" },
        "fork_name": fork.map(|f| f.id.full_name()).unwrap_or_default(),
        "fork_url": fork.map(|f| f.url.clone()).unwrap_or_default(),
        "fork_last_commit": fork
            .map(|f| f.last_commit.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
    })
}
