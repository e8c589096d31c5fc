use async_trait::async_trait;

use crate::{non_empty, send_json, take_results, JobSource, RawJob, Result, SearchParams};

const BASE_URL: &str = "https://data.usajobs.gov";

/// Client for the USAJOBS search API.
///
/// USAJOBS authenticates with an `Authorization-Key` header and requires the
/// registered e-mail address as the `User-Agent`; both must be present.
pub struct UsaJobsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    user_agent: Option<String>,
}

impl UsaJobsClient {
    pub fn new(api_key: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            api_key: non_empty(api_key),
            user_agent: non_empty(user_agent),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl JobSource for UsaJobsClient {
    fn source_name(&self) -> &'static str {
        "usajobs"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.user_agent.is_some()
    }

    async fn fetch_jobs(&self, params: &SearchParams) -> Result<Vec<RawJob>> {
        let (Some(api_key), Some(user_agent)) = (&self.api_key, &self.user_agent) else {
            tracing::warn!("USAJOBS credentials missing, skipping fetch");
            return Ok(Vec::new());
        };

        let url = format!("{}/api/search", self.base_url);
        let per_page = params.per_page.to_string();
        let request = self
            .client
            .get(&url)
            .header("Authorization-Key", api_key.as_str())
            .header(reqwest::header::USER_AGENT, user_agent.as_str())
            .query(&[
                ("Keyword", params.query.as_str()),
                ("LocationName", params.location.as_str()),
                ("ResultsPerPage", per_page.as_str()),
            ]);

        let body = send_json(self.source_name(), request).await?;
        Ok(take_results(body, &["SearchResult", "SearchResultItems"]))
    }
}
