use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

pub const DEFAULT_SEARCH_LIMIT: i64 = 50;
pub const MAX_SEARCH_LIMIT: i64 = 200;

/// Keyword search criteria. Every field is optional; unset fields do not
/// restrict the result.
///
/// ```rust
/// use job_finder_core::domains::search::SearchFilters;
///
/// let filters = SearchFilters::builder()
///     .query("rust")
///     .skills(vec!["postgresql".to_string()])
///     .limit(10)
///     .build();
/// assert_eq!(filters.effective_limit(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct SearchFilters {
    /// Matched against title, description and company
    #[builder(default, setter(strip_option))]
    pub query: Option<String>,
    #[builder(default, setter(strip_option))]
    pub location: Option<String>,
    #[builder(default, setter(strip_option))]
    pub company: Option<String>,
    /// Every listed skill must appear in the posting
    #[builder(default)]
    pub skills: Vec<String>,
    /// Exact connector name
    #[builder(default, setter(strip_option))]
    pub source: Option<String>,
    /// Only postings dated within this many days
    #[builder(default, setter(strip_option))]
    pub days_old: Option<i32>,
    #[builder(default = DEFAULT_SEARCH_LIMIT)]
    pub limit: i64,
    #[builder(default = 0)]
    pub offset: i64,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn term(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl SearchFilters {
    pub fn query_term(&self) -> Option<&str> {
        term(&self.query)
    }

    pub fn location_term(&self) -> Option<&str> {
        term(&self.location)
    }

    pub fn company_term(&self) -> Option<&str> {
        term(&self.company)
    }

    pub fn source_term(&self) -> Option<&str> {
        term(&self.source)
    }

    /// Non-blank skills, or `None` when the filter is unused.
    pub fn skill_terms(&self) -> Option<Vec<&str>> {
        let terms: Vec<&str> = self
            .skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        (!terms.is_empty()).then_some(terms)
    }

    pub fn effective_limit(&self) -> i64 {
        self.limit.clamp(1, MAX_SEARCH_LIMIT)
    }

    pub fn effective_offset(&self) -> i64 {
        self.offset.max(0)
    }
}
