//! Integration tests for the job record store.

mod common;

use crate::common::{create_job, days_ago, TestHarness};
use chrono::NaiveDate;
use job_finder_core::common::JobPostingId;
use job_finder_core::domains::jobs::{JobPosting, JobStoreError, NewJobPosting, ValidationError};
use job_finder_core::kernel::verify_jobs_schema;
use test_context::{test_context, AsyncTestContext};

#[test_context(TestHarness)]
#[tokio::test]
async fn insert_returns_posting_with_assigned_id(ctx: &TestHarness) {
    let new = NewJobPosting::builder()
        .title("Backend Engineer")
        .company("Acme")
        .location("Remote")
        .description("Build APIs")
        .url("https://jobs.example.com/1")
        .source("adzuna")
        .posting_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        .skills(vec!["python".to_string(), "sql".to_string()])
        .build();

    let job = JobPosting::insert(new, &ctx.db_pool).await.unwrap();

    assert!(job.id.into_inner() > 0);
    assert_eq!(job.title, "Backend Engineer");
    assert_eq!(job.company, "Acme");
    assert_eq!(job.location.as_deref(), Some("Remote"));
    assert_eq!(job.source.as_deref(), Some("adzuna"));
    assert_eq!(job.posting_date, NaiveDate::from_ymd_opt(2024, 1, 15));
    assert_eq!(
        job.skills,
        Some(vec!["python".to_string(), "sql".to_string()])
    );

    let found = JobPosting::find_by_id(job.id, &ctx.db_pool)
        .await
        .unwrap()
        .expect("posting should be stored");
    assert_eq!(found.title, "Backend Engineer");
    assert_eq!(found.skills, job.skills);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn insert_with_only_required_fields(ctx: &TestHarness) {
    let new = NewJobPosting::builder().title("QA Analyst").company("Initech").build();

    let job = JobPosting::insert(new, &ctx.db_pool).await.unwrap();

    assert!(job.location.is_none());
    assert!(job.description.is_none());
    assert!(job.url.is_none());
    assert!(job.source.is_none());
    assert!(job.posting_date.is_none());
    assert!(job.skills.is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn blank_required_fields_are_rejected_without_writing(ctx: &TestHarness) {
    let missing_title = NewJobPosting::builder().title("   ").company("Acme").build();
    let err = JobPosting::insert(missing_title, &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(matches!(
        err,
        JobStoreError::Validation(ValidationError::MissingField("title"))
    ));

    let missing_company = NewJobPosting::builder().title("Engineer").company("").build();
    let err = JobPosting::insert(missing_company, &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        JobStoreError::Validation(ValidationError::MissingField("company"))
    ));

    assert_eq!(JobPosting::count(&ctx.db_pool).await.unwrap(), 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn duplicate_postings_get_distinct_ids(ctx: &TestHarness) {
    let new = NewJobPosting::builder()
        .title("Data Engineer")
        .company("Globex")
        .url("https://jobs.example.com/same")
        .build();

    let first = JobPosting::insert(new.clone(), &ctx.db_pool).await.unwrap();
    let second = JobPosting::insert(new, &ctx.db_pool).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(JobPosting::count(&ctx.db_pool).await.unwrap(), 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn title_and_company_are_trimmed_and_skills_normalized(ctx: &TestHarness) {
    let new = NewJobPosting::builder()
        .title("  Rust Developer ")
        .company(" Ferris Inc ")
        .skills(vec![
            " Rust".to_string(),
            "".to_string(),
            "Tokio".to_string(),
            "Rust".to_string(),
        ])
        .build();

    let job = JobPosting::insert(new, &ctx.db_pool).await.unwrap();

    assert_eq!(job.title, "Rust Developer");
    assert_eq!(job.company, "Ferris Inc");
    assert_eq!(
        job.skills,
        Some(vec!["Rust".to_string(), "Tokio".to_string()])
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn find_recent_orders_newest_first(ctx: &TestHarness) {
    create_job(&ctx.db_pool, "Old", "A", &[], 40).await.unwrap();
    let older = create_job(&ctx.db_pool, "Older", "B", &[], 5).await.unwrap();
    let newer = create_job(&ctx.db_pool, "Newer", "C", &[], 1).await.unwrap();

    let recent = JobPosting::find_recent(30, 10, &ctx.db_pool).await.unwrap();

    let ids: Vec<_> = recent.iter().map(|j| j.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
    assert_eq!(recent[0].posting_date, Some(days_ago(1)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn existing_urls_ignores_postings_without_url(ctx: &TestHarness) {
    for url in [Some("https://a.example.com"), None, Some("https://b.example.com")] {
        let mut new = NewJobPosting::builder().title("Dev").company("Acme").build();
        new.url = url.map(str::to_string);
        JobPosting::insert(new, &ctx.db_pool).await.unwrap();
    }

    let urls = JobPosting::existing_urls(&ctx.db_pool).await.unwrap();

    assert_eq!(urls.len(), 2);
    assert!(urls.contains("https://a.example.com"));
    assert!(urls.contains("https://b.example.com"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn set_skills_fills_posting_without_skills(ctx: &TestHarness) {
    let job = create_job(&ctx.db_pool, "Dev", "Acme", &[], 0).await.unwrap();
    assert_eq!(JobPosting::count_without_skills(&ctx.db_pool).await.unwrap(), 1);

    let updated = JobPosting::set_skills(job.id, &["Go".to_string()], &ctx.db_pool)
        .await
        .unwrap()
        .expect("posting without skills is updated");

    assert_eq!(updated.skills, Some(vec!["Go".to_string()]));
    assert_eq!(JobPosting::count_without_skills(&ctx.db_pool).await.unwrap(), 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn set_skills_leaves_existing_skills_alone(ctx: &TestHarness) {
    let job = create_job(&ctx.db_pool, "Dev", "Acme", &["Rust"], 0).await.unwrap();

    let updated = JobPosting::set_skills(job.id, &["Go".to_string()], &ctx.db_pool)
        .await
        .unwrap();
    assert!(updated.is_none());

    let stored = JobPosting::find_by_id(job.id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.skills, Some(vec!["Rust".to_string()]));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn set_skills_on_missing_posting_is_none(ctx: &TestHarness) {
    let updated = JobPosting::set_skills(
        JobPostingId::from_raw(4242),
        &["Go".to_string()],
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert!(updated.is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn migrated_schema_matches_expected_layout(ctx: &TestHarness) {
    let problems = verify_jobs_schema(&ctx.db_pool).await.unwrap();
    assert!(problems.is_empty(), "unexpected schema problems: {:?}", problems);
}

#[tokio::test]
async fn teardown_drops_the_per_test_database() {
    let harness = TestHarness::new().await.unwrap();
    let database = harness.database.clone();
    assert!(TestHarness::database_exists(&database).await.unwrap());

    harness.teardown().await;

    assert!(!TestHarness::database_exists(&database).await.unwrap());
}
