use async_trait::async_trait;

use crate::{non_empty, send_json, take_results, JobSource, RawJob, Result, SearchParams};

const BASE_URL: &str = "https://api.adzuna.com/v1/api";

/// Client for the Adzuna job search API.
pub struct AdzunaClient {
    client: reqwest::Client,
    base_url: String,
    country: String,
    app_id: Option<String>,
    app_key: Option<String>,
}

impl AdzunaClient {
    pub fn new(app_id: Option<String>, app_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            country: "us".to_string(),
            app_id: non_empty(app_id),
            app_key: non_empty(app_key),
        }
    }

    /// Country path segment (`us`, `gb`, `de`, ...).
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl JobSource for AdzunaClient {
    fn source_name(&self) -> &'static str {
        "adzuna"
    }

    fn is_configured(&self) -> bool {
        self.app_id.is_some() && self.app_key.is_some()
    }

    async fn fetch_jobs(&self, params: &SearchParams) -> Result<Vec<RawJob>> {
        let (Some(app_id), Some(app_key)) = (&self.app_id, &self.app_key) else {
            tracing::warn!("Adzuna credentials missing, skipping fetch");
            return Ok(Vec::new());
        };

        let url = format!("{}/jobs/{}/search/1", self.base_url, self.country);
        let per_page = params.per_page.to_string();
        let request = self.client.get(&url).query(&[
            ("app_id", app_id.as_str()),
            ("app_key", app_key.as_str()),
            ("what", params.query.as_str()),
            ("where", params.location.as_str()),
            ("results_per_page", per_page.as_str()),
            ("content-type", "application/json"),
        ]);

        let body = send_json(self.source_name(), request).await?;
        let jobs = take_results(body, &["results"]);
        tracing::debug!(count = jobs.len(), "Fetched Adzuna postings");

        Ok(jobs)
    }
}
