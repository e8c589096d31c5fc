use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::common::utils::generate_fields_hash;
use crate::domains::jobs::NewJobPosting;

/// How one ingestion batch is deduplicated before it is stored.
///
/// The store itself never deduplicates; this is a pipeline choice.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Keep every posting
    None,
    /// Drop later postings whose URL was already seen in the batch
    #[default]
    Url,
    /// Drop later postings with the same title, company, location and date
    Content,
}

impl std::fmt::Display for DedupPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DedupPolicy::None => write!(f, "none"),
            DedupPolicy::Url => write!(f, "url"),
            DedupPolicy::Content => write!(f, "content"),
        }
    }
}

/// Fingerprint used by [`DedupPolicy::Content`].
pub fn content_key(job: &NewJobPosting) -> String {
    let date = job.posting_date.map(|d| d.to_string());
    generate_fields_hash([
        Some(job.title.as_str()),
        Some(job.company.as_str()),
        job.location.as_deref(),
        date.as_deref(),
    ])
}

/// Split a batch into the postings to keep and the number dropped.
///
/// The first occurrence wins. Under the URL policy, postings without a
/// URL are always kept.
pub fn dedup_postings<T>(
    items: Vec<T>,
    policy: DedupPolicy,
    posting: impl Fn(&T) -> &NewJobPosting,
) -> (Vec<T>, usize) {
    if policy == DedupPolicy::None {
        return (items, 0);
    }

    let total = items.len();
    let mut seen = HashSet::new();
    let kept: Vec<T> = items
        .into_iter()
        .filter(|item| {
            let job = posting(item);
            match policy {
                DedupPolicy::None => true,
                DedupPolicy::Url => match job.url.as_deref().map(str::trim) {
                    Some(url) if !url.is_empty() => seen.insert(url.to_string()),
                    _ => true,
                },
                DedupPolicy::Content => seen.insert(content_key(job)),
            }
        })
        .collect();

    let dropped = total - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn posting(title: &str, company: &str, url: Option<&str>) -> NewJobPosting {
        NewJobPosting {
            title: title.to_string(),
            company: company.to_string(),
            url: url.map(str::to_string),
            ..Default::default()
        }
    }

    fn titles(jobs: &[NewJobPosting]) -> Vec<&str> {
        jobs.iter().map(|j| j.title.as_str()).collect()
    }

    #[test]
    fn test_none_keeps_everything() {
        let jobs = vec![posting("A", "X", Some("u")), posting("A", "X", Some("u"))];
        let (kept, dropped) = dedup_postings(jobs, DedupPolicy::None, |j| j);
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_url_policy_keeps_first_and_urlless() {
        let jobs = vec![
            posting("First", "X", Some("https://a")),
            posting("Second", "Y", Some("https://a")),
            posting("Third", "Z", None),
            posting("Fourth", "Z", None),
            posting("Fifth", "Z", Some("https://b")),
        ];

        let (kept, dropped) = dedup_postings(jobs, DedupPolicy::Url, |j| j);

        assert_eq!(titles(&kept), vec!["First", "Third", "Fourth", "Fifth"]);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_content_policy_ignores_url_and_formatting() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1);
        let mut a = posting("Rust Engineer", "Acme, Inc.", Some("https://a"));
        a.posting_date = date;
        let mut b = posting("rust engineer", "ACME Inc", Some("https://b"));
        b.posting_date = date;
        let mut c = posting("Rust Engineer", "Acme, Inc.", Some("https://c"));
        c.posting_date = NaiveDate::from_ymd_opt(2024, 5, 2);

        let (kept, dropped) = dedup_postings(vec![a, b, c], DedupPolicy::Content, |j| j);

        assert_eq!(kept.len(), 2);
        assert_eq!(dropped, 1);
        assert_eq!(kept[0].url.as_deref(), Some("https://a"));
    }

    #[test]
    fn test_policy_display() {
        assert_eq!(DedupPolicy::default().to_string(), "url");
        assert_eq!(DedupPolicy::Content.to_string(), "content");
    }
}
