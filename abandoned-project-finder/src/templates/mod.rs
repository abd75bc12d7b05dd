//! Console summary rendering using Handlebars.
//!
//! The top-N summary printed at the end of a run is a template so that it
//! can be replaced through the `summary-template` setting.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, SummaryRenderer, DEFAULT_SUMMARY_TEMPLATE};

/// Formats an integer with `,` thousands separators.
#[must_use]
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
