//! Integration tests for the ingestion pipeline, using in-process fake sources.

mod common;

use std::sync::Arc;

use std::time::Duration;

use crate::common::{
    create_job, raw_job, FailingSource, SlowSource, StaticSource, TestHarness,
    UnconfiguredSource,
};
use job_finder_core::domains::ingestion::{
    backfill_skills, run_incremental_update, run_pipeline, DedupPolicy, PipelineOptions,
    NO_DATA_MESSAGE,
};
use job_finder_core::domains::jobs::{
    IngestionRun, JobPosting, RunStatus, PIPELINE_COMPLETE_SOURCE,
};
use job_finder_core::kernel::PipelineDeps;
use job_sources::{JobSource, RawJob};
use serde_json::json;
use test_context::test_context;

fn alpha_batch() -> Vec<RawJob> {
    vec![
        raw_job("Backend Engineer", "Acme", Some("https://jobs.example.com/1"), "Python and Docker"),
        raw_job("Frontend Engineer", "Acme", Some("https://jobs.example.com/2"), "React"),
        raw_job("Backend Engineer", "Acme", Some("https://jobs.example.com/1"), "Reposted"),
        json!({"title": "No Company", "url": "https://jobs.example.com/3"}),
    ]
}

fn deps(ctx: &TestHarness, sources: Vec<Arc<dyn JobSource>>) -> PipelineDeps {
    PipelineDeps::new(ctx.db_pool.clone(), sources)
}

#[test_context(TestHarness)]
#[tokio::test]
async fn run_stores_valid_unique_postings(ctx: &TestHarness) {
    let deps = deps(ctx, vec![Arc::new(StaticSource::new("alpha", alpha_batch()))]);

    let report = run_pipeline(&deps, &PipelineOptions::default()).await.unwrap();

    assert_eq!(report.fetched, 4);
    assert_eq!(report.rejected, 1);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(JobPosting::count(&ctx.db_pool).await.unwrap(), 2);

    let backend = report
        .stored
        .iter()
        .find(|j| j.title == "Backend Engineer")
        .expect("backend posting stored");
    assert_eq!(backend.source.as_deref(), Some("alpha"));
    assert_eq!(
        backend.skills,
        Some(vec![
            "Back-End".to_string(),
            "Docker".to_string(),
            "Python".to_string()
        ])
    );

    let source = &report.sources[0];
    assert_eq!(source.status, RunStatus::Completed);
    assert_eq!(source.fetched, 4);
    assert_eq!(source.rejected, 1);
    assert_eq!(source.skipped, 1);
    assert_eq!(source.inserted, 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn dedup_none_keeps_every_valid_posting(ctx: &TestHarness) {
    let deps = deps(ctx, vec![Arc::new(StaticSource::new("alpha", alpha_batch()))]);
    let options = PipelineOptions::builder().dedup(DedupPolicy::None).build();

    let report = run_pipeline(&deps, &options).await.unwrap();

    assert_eq!(report.duplicates, 0);
    assert_eq!(report.inserted, 3);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn dedup_content_drops_reposts_under_new_urls(ctx: &TestHarness) {
    let batch = vec![
        raw_job("Data Engineer", "Globex", Some("https://a.example.com/1"), "Spark"),
        raw_job("Data Engineer", "Globex", Some("https://b.example.com/9"), "Spark"),
        raw_job("Data Analyst", "Globex", Some("https://a.example.com/2"), "SQL"),
    ];
    let deps = deps(ctx, vec![Arc::new(StaticSource::new("alpha", batch))]);

    let by_url = run_pipeline(
        &deps,
        &PipelineOptions::builder().save(false).dedup(DedupPolicy::Url).build(),
    )
    .await
    .unwrap();
    assert_eq!(by_url.postings.len(), 3);

    let by_content = run_pipeline(
        &deps,
        &PipelineOptions::builder().dedup(DedupPolicy::Content).build(),
    )
    .await
    .unwrap();
    assert_eq!(by_content.duplicates, 1);
    assert_eq!(by_content.inserted, 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn no_save_leaves_store_untouched(ctx: &TestHarness) {
    let deps = deps(ctx, vec![Arc::new(StaticSource::new("alpha", alpha_batch()))]);
    let options = PipelineOptions::builder().save(false).build();

    let report = run_pipeline(&deps, &options).await.unwrap();

    assert_eq!(report.postings.len(), 2);
    assert_eq!(report.postings_with_skills(), 2);
    assert_eq!(report.inserted, 0);
    assert!(report.stored.is_empty());
    assert_eq!(JobPosting::count(&ctx.db_pool).await.unwrap(), 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn failing_source_does_not_abort_the_run(ctx: &TestHarness) {
    let deps = deps(
        ctx,
        vec![
            Arc::new(FailingSource),
            Arc::new(UnconfiguredSource),
            Arc::new(StaticSource::new("alpha", alpha_batch())),
        ],
    );

    let report = run_pipeline(&deps, &PipelineOptions::default()).await.unwrap();

    assert_eq!(report.inserted, 2);
    let statuses: Vec<_> = report
        .sources
        .iter()
        .map(|s| (s.source.as_str(), s.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("broken", RunStatus::Failed),
            ("unconfigured", RunStatus::NoData),
            ("alpha", RunStatus::Completed),
        ]
    );
    assert!(report.sources[0]
        .error
        .as_deref()
        .is_some_and(|e| e.contains("503")));
    assert_eq!(report.sources[1].error.as_deref(), Some(NO_DATA_MESSAGE));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn every_source_and_the_summary_are_logged(ctx: &TestHarness) {
    let deps = deps(
        ctx,
        vec![
            Arc::new(FailingSource),
            Arc::new(StaticSource::new("alpha", alpha_batch())),
        ],
    );

    run_pipeline(&deps, &PipelineOptions::default()).await.unwrap();

    let runs = IngestionRun::find_recent(10, &ctx.db_pool).await.unwrap();
    assert_eq!(runs.len(), 3);

    let failed = runs.iter().find(|r| r.source == "broken").unwrap();
    assert_eq!(failed.status().unwrap(), RunStatus::Failed);
    assert!(failed.error_message.is_some());

    let alpha = runs.iter().find(|r| r.source == "alpha").unwrap();
    assert_eq!(alpha.status().unwrap(), RunStatus::Completed);
    assert_eq!(alpha.jobs_fetched, 4);
    assert_eq!(alpha.jobs_inserted, 2);
    assert_eq!(alpha.jobs_skipped, 2);
    assert!(alpha.completed_at.is_some());
    assert!(alpha.duration_seconds.is_some_and(|d| d >= 0.0));

    let summary = runs
        .iter()
        .find(|r| r.source == PIPELINE_COMPLETE_SOURCE)
        .unwrap();
    assert_eq!(summary.jobs_fetched, 4);
    assert_eq!(summary.jobs_inserted, 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn incremental_update_skips_known_and_url_less_postings(ctx: &TestHarness) {
    let first = vec![raw_job("Backend Engineer", "Acme", Some("https://jobs.example.com/1"), "Go")];
    let deps_first = deps(ctx, vec![Arc::new(StaticSource::new("alpha", first))]);
    run_pipeline(&deps_first, &PipelineOptions::default()).await.unwrap();

    let second = vec![
        raw_job("Backend Engineer", "Acme", Some("https://jobs.example.com/1"), "Go"),
        raw_job("SRE", "Acme", Some("https://jobs.example.com/4"), "Kubernetes"),
        raw_job("Mystery Role", "Acme", None, "No link"),
    ];
    let deps_second = deps(ctx, vec![Arc::new(StaticSource::new("alpha", second))]);
    let options = PipelineOptions::builder()
        .save(false)
        .dedup(DedupPolicy::None)
        .build();

    let report = run_incremental_update(&deps_second, &options).await.unwrap();

    assert_eq!(report.already_stored, 2);
    assert_eq!(report.inserted, 1);
    assert_eq!(report.stored[0].title, "SRE");
    assert_eq!(JobPosting::count(&ctx.db_pool).await.unwrap(), 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn empty_source_is_recorded_as_no_data(ctx: &TestHarness) {
    let source = Arc::new(StaticSource::new("alpha", Vec::new()));
    let deps = deps(ctx, vec![source.clone() as Arc<dyn JobSource>]);

    let report = run_pipeline(&deps, &PipelineOptions::default()).await.unwrap();

    assert_eq!(source.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(report.sources[0].status, RunStatus::NoData);
    assert_eq!(report.sources[0].error.as_deref(), Some(NO_DATA_MESSAGE));

    let runs = IngestionRun::find_recent(10, &ctx.db_pool).await.unwrap();
    let logged = runs.iter().find(|r| r.source == "alpha").unwrap();
    assert_eq!(logged.status().unwrap(), RunStatus::NoData);
    assert_eq!(logged.error_message.as_deref(), Some(NO_DATA_MESSAGE));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn source_run_duration_covers_only_its_own_fetch(ctx: &TestHarness) {
    let deps = deps(
        ctx,
        vec![
            Arc::new(StaticSource::new("alpha", alpha_batch())),
            Arc::new(SlowSource {
                name: "slow",
                delay: Duration::from_millis(750),
                jobs: vec![raw_job("SRE", "Initech", Some("https://slow.example.com/1"), "Go")],
            }),
        ],
    );

    let report = run_pipeline(&deps, &PipelineOptions::default()).await.unwrap();

    let runs = IngestionRun::find_recent(10, &ctx.db_pool).await.unwrap();
    let alpha = runs.iter().find(|r| r.source == "alpha").unwrap();
    let logged = alpha.duration_seconds.unwrap();
    let reported = report.sources[0].duration_seconds;
    assert!(logged < 0.5, "alpha logged {logged}s, includes the slow source");
    assert!((logged - reported).abs() < 0.05, "logged {logged}s, reported {reported}s");

    let slow = runs.iter().find(|r| r.source == "slow").unwrap();
    assert!(slow.duration_seconds.unwrap() >= 0.7);
    assert!(slow.completed_at.unwrap() >= alpha.completed_at.unwrap());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn backfill_fills_missing_skills(ctx: &TestHarness) {
    create_job(&ctx.db_pool, "Senior Rust Engineer", "Ferris Inc", &[], 0)
        .await
        .unwrap();
    create_job(&ctx.db_pool, "Office Manager", "Acme", &[], 0)
        .await
        .unwrap();
    create_job(&ctx.db_pool, "Go Developer", "Gopher Co", &["Go"], 0)
        .await
        .unwrap();

    let dry = backfill_skills(&ctx.db_pool, 1, true).await.unwrap();
    assert_eq!(dry.candidates, 2);
    assert_eq!(dry.updated, 1);
    assert_eq!(dry.unchanged, 1);
    assert_eq!(JobPosting::count_without_skills(&ctx.db_pool).await.unwrap(), 2);

    let report = backfill_skills(&ctx.db_pool, 1, false).await.unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.unchanged, 1);
    assert_eq!(JobPosting::count_without_skills(&ctx.db_pool).await.unwrap(), 1);

    let top = JobPosting::top_skills(10, &ctx.db_pool).await.unwrap();
    assert!(top.iter().any(|s| s.skill == "Rust"));
}
