//! Abandonment score.

/// Scores a candidate; higher means a better candidate for featuring.
///
/// `(stars / 1000) * (days_abandoned / 365) * (1 / (open_issues + 1))`
///
/// Popular, long-dormant projects with few open issues rank highest.
#[must_use]
pub fn score(stars: u64, days_abandoned: u64, open_issues: u64) -> f64 {
    let star_factor = stars as f64 / 1000.0;
    let abandonment_factor = days_abandoned as f64 / 365.0;
    let issue_factor = 1.0 / (open_issues as f64 + 1.0);

    star_factor * abandonment_factor * issue_factor
}
