//! Test fixtures: postings, raw payloads and fake job sources.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use job_finder_core::domains::jobs::{JobPosting, NewJobPosting};
use job_sources::{JobSource, RawJob, SearchParams, SourceError};
use serde_json::json;
use sqlx::PgPool;

pub fn days_ago(days: i64) -> NaiveDate {
    (Utc::now() - Duration::days(days)).date_naive()
}

/// Insert a posting with the given skills, posted `age_days` ago
pub async fn create_job(
    pool: &PgPool,
    title: &str,
    company: &str,
    skills: &[&str],
    age_days: i64,
) -> Result<JobPosting> {
    let mut new = NewJobPosting::builder()
        .title(title)
        .company(company)
        .source("test")
        .posting_date(days_ago(age_days))
        .build();
    if !skills.is_empty() {
        new.skills = Some(skills.iter().map(|s| s.to_string()).collect());
    }
    Ok(JobPosting::insert(new, pool).await?)
}

/// A generic-format raw posting
pub fn raw_job(title: &str, company: &str, url: Option<&str>, description: &str) -> RawJob {
    json!({
        "title": title,
        "company": company,
        "location": "Remote",
        "description": description,
        "url": url,
        "posting_date": "2024-05-01"
    })
}

/// Source that always returns the same batch
pub struct StaticSource {
    pub name: &'static str,
    pub jobs: Vec<RawJob>,
    pub calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(name: &'static str, jobs: Vec<RawJob>) -> Self {
        Self {
            name,
            jobs,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl JobSource for StaticSource {
    fn source_name(&self) -> &'static str {
        self.name
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn fetch_jobs(&self, _params: &SearchParams) -> Result<Vec<RawJob>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.jobs.clone())
    }
}

/// Source whose API always rejects the request
pub struct FailingSource;

#[async_trait]
impl JobSource for FailingSource {
    fn source_name(&self) -> &'static str {
        "broken"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn fetch_jobs(&self, _params: &SearchParams) -> Result<Vec<RawJob>, SourceError> {
        Err(SourceError::Api {
            source_name: "broken",
            status: 503,
            message: "service unavailable".to_string(),
        })
    }
}

/// Source without credentials
pub struct UnconfiguredSource;

#[async_trait]
impl JobSource for UnconfiguredSource {
    fn source_name(&self) -> &'static str {
        "unconfigured"
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn fetch_jobs(&self, _params: &SearchParams) -> Result<Vec<RawJob>, SourceError> {
        Ok(Vec::new())
    }
}

/// Source that takes `delay` to answer with its batch
pub struct SlowSource {
    pub name: &'static str,
    pub delay: std::time::Duration,
    pub jobs: Vec<RawJob>,
}

#[async_trait]
impl JobSource for SlowSource {
    fn source_name(&self) -> &'static str {
        self.name
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn fetch_jobs(&self, _params: &SearchParams) -> Result<Vec<RawJob>, SourceError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.jobs.clone())
    }
}
