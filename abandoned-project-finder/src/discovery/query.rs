//! Repository search query construction.

use chrono::{DateTime, Days, NaiveDate, Utc};

/// Filters for the repository search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Primary language filter; `None` searches every language.
    pub language: Option<String>,
    /// Minimum star count.
    pub min_stars: u64,
    /// Only repositories last pushed on or before this date.
    pub pushed_until: Option<NaiveDate>,
}

impl SearchQuery {
    /// Creates a query for repositories with at least `min_stars` stars.
    pub fn new(min_stars: u64) -> Self {
        Self {
            language: None,
            min_stars,
            pushed_until: None,
        }
    }

    /// Restricts results to a language.
    #[must_use]
    pub fn with_language(mut self, language: Option<&str>) -> Self {
        self.language = language.map(str::to_string);
        self
    }

    /// Restricts results to repositories not pushed to within `days` of `as_of`.
    ///
    /// The boundary date is included: a push on it may still be `days` whole
    /// days before `as_of`. This only narrows the search; the commit history
    /// decides abandonment.
    #[must_use]
    pub fn inactive_for(mut self, days: u64, as_of: DateTime<Utc>) -> Self {
        self.pushed_until = as_of.date_naive().checked_sub_days(Days::new(days));
        self
    }

    /// Renders the GitHub search syntax.
    ///
    /// Format: `language:{lang} stars:>={min} pushed:<={date} archived:false`
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::with_capacity(4);
        if let Some(language) = &self.language {
            parts.push(format!("language:{language}"));
        }
        parts.push(format!("stars:>={}", self.min_stars));
        if let Some(date) = self.pushed_until {
            parts.push(format!("pushed:<={}", date.format("%Y-%m-%d")));
        }
        parts.push("archived:false".to_string());
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_build_search_query() {
        let as_of = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let query = SearchQuery::new(1000)
            .with_language(Some("python"))
            .inactive_for(365, as_of);

        assert_eq!(
            query.to_query_string(),
            "language:python stars:>=1000 pushed:<=2023-06-02 archived:false"
        );
    }

    #[test]
    fn boundary_date_is_searched() {
        // Pushed early on the boundary date: exactly 365 whole days idle.
        let as_of = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let pushed = Utc.with_ymd_and_hms(2023, 6, 2, 8, 0, 0).unwrap();
        assert_eq!((as_of - pushed).num_days(), 365);

        let query = SearchQuery::new(1000).inactive_for(365, as_of);
        assert_eq!(query.pushed_until, Some(pushed.date_naive()));
        assert!(query.to_query_string().contains("pushed:<=2023-06-02"));
    }

    #[test]
    fn omits_optional_filters() {
        assert_eq!(
            SearchQuery::new(0).to_query_string(),
            "stars:>=0 archived:false"
        );
    }
}
