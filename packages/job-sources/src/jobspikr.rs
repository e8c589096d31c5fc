use async_trait::async_trait;

use crate::{non_empty, send_json, take_results, JobSource, RawJob, Result, SearchParams};

const BASE_URL: &str = "https://api.jobspikr.com";

/// Client for the JobsPikr commercial job listings API.
pub struct JobsPikrClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl JobsPikrClient {
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
impl JobSource for JobsPikrClient {
    fn source_name(&self) -> &'static str {
        "jobspikr"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_jobs(&self, params: &SearchParams) -> Result<Vec<RawJob>> {
        let Some(api_key) = &self.api_key else {
            tracing::warn!("JobsPikr API key missing, skipping fetch");
            return Ok(Vec::new());
        };

        let url = format!("{}/v2/data", self.base_url);
        let per_page = params.per_page.to_string();
        let request = self
            .client
            .get(&url)
            .header("x-api-key", api_key.as_str())
            .query(&[
                ("query", params.query.as_str()),
                ("country", params.location.as_str()),
                ("per_page", per_page.as_str()),
            ]);

        let body = send_json(self.source_name(), request).await?;
        Ok(take_results(body, &["data"]))
    }
}
