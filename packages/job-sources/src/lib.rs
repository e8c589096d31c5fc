//! Pure REST clients for job board search APIs.
//!
//! Each client implements [`JobSource`] and returns the raw JSON postings
//! exactly as the provider sends them. Mapping those payloads onto the
//! persisted job schema is the caller's job.
//!
//! A client constructed without credentials is valid: `fetch_jobs` logs a
//! warning and returns an empty list without touching the network.
//!
//! # Example
//!
//! ```rust,ignore
//! use job_sources::{AdzunaClient, JobSource, SearchParams};
//!
//! let client = AdzunaClient::new(Some("app-id".into()), Some("app-key".into()));
//! let postings = client.fetch_jobs(&SearchParams::default()).await?;
//! println!("{} postings from {}", postings.len(), client.source_name());
//! ```

pub mod adzuna;
pub mod error;
pub mod jobspikr;
pub mod usajobs;
pub mod ziprecruiter;

pub use adzuna::AdzunaClient;
pub use error::{Result, SourceError};
pub use jobspikr::JobsPikrClient;
pub use usajobs::UsaJobsClient;
pub use ziprecruiter::ZipRecruiterClient;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

/// A single posting as returned by a provider, before normalization.
pub type RawJob = Value;

/// Per-request timeout shared by every client.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Search parameters accepted by every source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    pub location: String,
    pub per_page: u32,
}

impl SearchParams {
    pub fn new(query: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            location: location.into(),
            ..Self::default()
        }
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: "software engineer".to_string(),
            location: "United States".to_string(),
            per_page: 20,
        }
    }
}

/// A provider of raw job postings.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Stable connector name, stored in the `source` column.
    fn source_name(&self) -> &'static str;

    /// Whether the credentials this source needs are present.
    fn is_configured(&self) -> bool;

    /// Fetch one page of postings matching `params`.
    async fn fetch_jobs(&self, params: &SearchParams) -> Result<Vec<RawJob>>;
}

/// Send a request and decode the JSON body, mapping non-2xx responses to
/// [`SourceError::Api`].
pub(crate) async fn send_json(
    source_name: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<Value> {
    let resp = request.timeout(REQUEST_TIMEOUT).send().await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(SourceError::Api {
            source_name,
            status: status.as_u16(),
            message: body,
        });
    }

    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Pull the array found at `path` out of a response body.
///
/// A missing key or a non-array value yields an empty list, which is how
/// the providers report "no results".
pub(crate) fn take_results(mut body: Value, path: &[&str]) -> Vec<RawJob> {
    for key in path {
        body = match body.get_mut(*key) {
            Some(value) => value.take(),
            None => return Vec::new(),
        };
    }

    match body {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

/// Treat empty credentials the same as absent ones.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
