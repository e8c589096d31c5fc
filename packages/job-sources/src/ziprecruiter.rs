use async_trait::async_trait;

use crate::{non_empty, send_json, take_results, JobSource, RawJob, Result, SearchParams};

const BASE_URL: &str = "https://api.ziprecruiter.com";

/// Client for the ZipRecruiter job search API.
pub struct ZipRecruiterClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ZipRecruiterClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            api_key: non_empty(api_key),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl JobSource for ZipRecruiterClient {
    fn source_name(&self) -> &'static str {
        "ziprecruiter"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_jobs(&self, params: &SearchParams) -> Result<Vec<RawJob>> {
        let Some(api_key) = &self.api_key else {
            tracing::warn!("ZipRecruiter API key missing, skipping fetch");
            return Ok(Vec::new());
        };

        let url = format!("{}/jobs/v1", self.base_url);
        let per_page = params.per_page.to_string();
        let request = self.client.get(&url).query(&[
            ("api_key", api_key.as_str()),
            ("search", params.query.as_str()),
            ("location", params.location.as_str()),
            ("jobs_per_page", per_page.as_str()),
        ]);

        let body = send_json(self.source_name(), request).await?;
        Ok(take_results(body, &["jobs"]))
    }
}
