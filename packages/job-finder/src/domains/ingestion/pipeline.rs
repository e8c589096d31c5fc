//! One ingestion cycle across every job source.
//!
//! For each source: fetch, normalize, fill in missing skills, validate.
//! The combined batch is then deduplicated per [`DedupPolicy`] and, when
//! saving, inserted row by row. Every source gets an `ingestion_runs`
//! row and the run ends with a `pipeline_complete` summary row.
//!
//! A failing source is logged and recorded but never aborts the run.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use job_sources::{JobSource, SearchParams};
use serde::Serialize;
use typed_builder::TypedBuilder;

use crate::domains::ingestion::dedup::{dedup_postings, DedupPolicy};
use crate::domains::jobs::{
    normalize_job, IngestionRun, JobPosting, NewIngestionRun, NewJobPosting, RunStatus,
    PIPELINE_COMPLETE_SOURCE,
};
use crate::domains::skills::extract_posting_skills;
use crate::kernel::PipelineDeps;

pub const DEFAULT_QUERY: &str = "software engineer";
pub const DEFAULT_LOCATION: &str = "United States";

/// Error message logged for a source that returned nothing
pub const NO_DATA_MESSAGE: &str = "No jobs returned - check API credentials";

#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct PipelineOptions {
    #[builder(default = DEFAULT_QUERY.to_string())]
    pub query: String,
    #[builder(default = DEFAULT_LOCATION.to_string())]
    pub location: String,
    #[builder(default = 20)]
    pub per_page: u32,
    /// Insert the batch into the store
    #[builder(default = true)]
    pub save: bool,
    #[builder(default)]
    pub dedup: DedupPolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Outcome for one source
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub status: RunStatus,
    pub fetched: usize,
    pub normalized: usize,
    /// Failed validation (missing title or company)
    pub rejected: usize,
    /// Dropped by deduplication or because the URL was already stored
    pub skipped: usize,
    pub inserted: usize,
    /// Insert failed at the database
    pub failed: usize,
    pub error: Option<String>,
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub sources: Vec<SourceReport>,
    pub fetched: usize,
    pub normalized: usize,
    pub rejected: usize,
    pub duplicates: usize,
    pub already_stored: usize,
    pub inserted: usize,
    pub failed: usize,
    /// Postings kept after deduplication, whether or not they were saved
    pub postings: Vec<NewJobPosting>,
    /// Rows written by this run
    pub stored: Vec<JobPosting>,
    pub duration_seconds: f64,
}

impl PipelineReport {
    pub fn postings_with_skills(&self) -> usize {
        self.postings.iter().filter(|p| !p.lacks_skills()).count()
    }
}

/// A normalized posting tagged with the index of the source it came from
struct Candidate {
    source_idx: usize,
    job: NewJobPosting,
}

struct SourceProgress {
    report: SourceReport,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl SourceProgress {
    fn finish(mut report: SourceReport, started_at: DateTime<Utc>, timer: Instant) -> Self {
        report.duration_seconds = timer.elapsed().as_secs_f64();
        Self {
            report,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Run one ingestion cycle.
pub async fn run_pipeline(deps: &PipelineDeps, options: &PipelineOptions) -> Result<PipelineReport> {
    execute(deps, options, None).await
}

/// Run a cycle that only stores postings whose URL is not yet in the store.
///
/// Postings without a URL cannot be checked and are skipped. The batch is
/// always saved and deduplicated by URL.
pub async fn run_incremental_update(
    deps: &PipelineDeps,
    options: &PipelineOptions,
) -> Result<PipelineReport> {
    let existing = JobPosting::existing_urls(&deps.db_pool)
        .await
        .context("Failed to load existing job URLs")?;
    tracing::info!(existing = existing.len(), "Running incremental update");

    let options = PipelineOptions {
        save: true,
        dedup: DedupPolicy::Url,
        ..options.clone()
    };
    execute(deps, &options, Some(&existing)).await
}

async fn execute(
    deps: &PipelineDeps,
    options: &PipelineOptions,
    existing_urls: Option<&HashSet<String>>,
) -> Result<PipelineReport> {
    let pipeline_started_at = Utc::now();
    let timer = Instant::now();
    tracing::info!(
        query = %options.query,
        location = %options.location,
        save = options.save,
        dedup = %options.dedup,
        "Starting pipeline run"
    );

    let params = SearchParams {
        query: options.query.clone(),
        location: options.location.clone(),
        per_page: options.per_page,
    };

    let mut progress = Vec::with_capacity(deps.sources.len());
    let mut candidates = Vec::new();

    for (source_idx, source) in deps.sources.iter().enumerate() {
        let (entry, jobs) = fetch_source(source, &params).await;
        candidates.extend(jobs.into_iter().map(|job| Candidate { source_idx, job }));
        progress.push(entry);
    }

    let mut report = PipelineReport {
        fetched: progress.iter().map(|p| p.report.fetched).sum(),
        normalized: progress.iter().map(|p| p.report.normalized).sum(),
        rejected: progress.iter().map(|p| p.report.rejected).sum(),
        ..Default::default()
    };

    // Deduplicate the batch
    let before = candidates.len();
    let (mut candidates, duplicates) = dedup_postings(candidates, options.dedup, |c| &c.job);
    report.duplicates = duplicates;
    tracing::info!(before, after = candidates.len(), "Deduplicated batch");

    if let Some(existing) = existing_urls {
        let before = candidates.len();
        candidates.retain(|c| {
            c.job
                .url
                .as_deref()
                .is_some_and(|url| !existing.contains(url))
        });
        report.already_stored = before - candidates.len();
        tracing::info!(new = candidates.len(), "Filtered to postings not yet stored");
    }

    // Whatever a source lost after validation was deduplicated or already stored
    let mut kept_per_source = vec![0usize; progress.len()];
    for c in &candidates {
        kept_per_source[c.source_idx] += 1;
    }
    for (idx, entry) in progress.iter_mut().enumerate() {
        let valid = entry.report.normalized - entry.report.rejected;
        entry.report.skipped = valid.saturating_sub(kept_per_source[idx]);
    }

    if options.save && !candidates.is_empty() {
        tracing::info!(count = candidates.len(), "Saving postings to database");
        for c in &candidates {
            match JobPosting::insert(c.job.clone(), &deps.db_pool).await {
                Ok(job) => {
                    progress[c.source_idx].report.inserted += 1;
                    report.stored.push(job);
                }
                Err(e) => {
                    tracing::warn!(
                        title = %c.job.title,
                        error = %e,
                        "Failed to insert posting"
                    );
                    progress[c.source_idx].report.failed += 1;
                }
            }
        }
    }

    report.inserted = report.stored.len();
    report.failed = progress.iter().map(|p| p.report.failed).sum();
    report.postings = candidates.into_iter().map(|c| c.job).collect();

    for entry in &progress {
        record_source_run(deps, entry).await?;
    }

    report.duration_seconds = timer.elapsed().as_secs_f64();

    IngestionRun::record(
        NewIngestionRun::builder()
            .source(PIPELINE_COMPLETE_SOURCE)
            .status(RunStatus::Completed)
            .started_at(pipeline_started_at)
            .jobs_fetched(count(report.fetched))
            .jobs_inserted(count(report.inserted))
            .jobs_skipped(count(report.rejected + report.duplicates + report.already_stored))
            .jobs_failed(count(report.failed))
            .build(),
        &deps.db_pool,
    )
    .await
    .context("Failed to record pipeline run")?;

    report.sources = progress.into_iter().map(|p| p.report).collect();
    log_summary(&report);

    Ok(report)
}

/// Fetch and normalize one source. Never fails: fetch errors are captured
/// in the returned report.
async fn fetch_source(
    source: &Arc<dyn JobSource>,
    params: &SearchParams,
) -> (SourceProgress, Vec<NewJobPosting>) {
    let name = source.source_name();
    let started_at = Utc::now();
    let timer = Instant::now();
    tracing::info!(source = name, "Fetching jobs");

    let mut report = SourceReport {
        source: name.to_string(),
        status: RunStatus::Completed,
        fetched: 0,
        normalized: 0,
        rejected: 0,
        skipped: 0,
        inserted: 0,
        failed: 0,
        error: None,
        duration_seconds: 0.0,
    };

    let raw_jobs = match source.fetch_jobs(params).await {
        Ok(raw_jobs) => raw_jobs,
        Err(e) => {
            tracing::error!(source = name, error = %e, "Error fetching from source");
            report.status = RunStatus::Failed;
            report.error = Some(e.to_string());
            return (SourceProgress::finish(report, started_at, timer), Vec::new());
        }
    };

    if raw_jobs.is_empty() {
        tracing::warn!(
            source = name,
            configured = source.is_configured(),
            "No jobs returned from source"
        );
        report.status = RunStatus::NoData;
        report.error = Some(NO_DATA_MESSAGE.to_string());
        return (SourceProgress::finish(report, started_at, timer), Vec::new());
    }

    report.fetched = raw_jobs.len();
    let mut jobs = Vec::with_capacity(raw_jobs.len());
    for raw in &raw_jobs {
        let mut job = normalize_job(raw, name);
        report.normalized += 1;

        if let Err(e) = job.validate() {
            tracing::debug!(source = name, error = %e, "Rejected posting");
            report.rejected += 1;
            continue;
        }

        if job.lacks_skills() {
            let skills = extract_posting_skills(&job.title, job.description.as_deref());
            job.skills = (!skills.is_empty()).then_some(skills);
        }
        jobs.push(job);
    }

    let with_skills = jobs.iter().filter(|j| !j.lacks_skills()).count();
    tracing::info!(
        source = name,
        fetched = report.fetched,
        valid = jobs.len(),
        with_skills,
        "Normalized postings"
    );

    (SourceProgress::finish(report, started_at, timer), jobs)
}

async fn record_source_run(deps: &PipelineDeps, entry: &SourceProgress) -> Result<()> {
    let report = &entry.report;
    let mut run = NewIngestionRun::builder()
        .source(report.source.clone())
        .status(report.status)
        .started_at(entry.started_at)
        .completed_at(entry.finished_at)
        .jobs_fetched(count(report.fetched))
        .jobs_inserted(count(report.inserted))
        .jobs_skipped(count(report.rejected + report.skipped))
        .jobs_failed(count(report.failed))
        .build();
    run.error_message = report.error.clone();

    IngestionRun::record(run, &deps.db_pool)
        .await
        .with_context(|| format!("Failed to record ingestion run for {}", report.source))?;
    Ok(())
}

fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn log_summary(report: &PipelineReport) {
    tracing::info!(
        fetched = report.fetched,
        normalized = report.normalized,
        rejected = report.rejected,
        duplicates = report.duplicates,
        already_stored = report.already_stored,
        unique = report.postings.len(),
        with_skills = report.postings_with_skills(),
        inserted = report.inserted,
        failed = report.failed,
        duration_seconds = report.duration_seconds,
        "Pipeline summary"
    );
    for source in &report.sources {
        tracing::info!(
            source = %source.source,
            status = %source.status,
            fetched = source.fetched,
            inserted = source.inserted,
            rejected = source.rejected,
            skipped = source.skipped,
            failed = source.failed,
            duration_seconds = source.duration_seconds,
            "Source summary"
        );
    }
}
