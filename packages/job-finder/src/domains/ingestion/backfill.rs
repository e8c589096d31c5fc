use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::PgPool;

use crate::domains::jobs::JobPosting;
use crate::domains::skills::extract_posting_skills;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    /// Postings without skills when the backfill started
    pub candidates: i64,
    pub updated: usize,
    /// Postings where extraction found nothing, or whose skills were set
    /// by someone else meanwhile
    pub unchanged: usize,
}

/// Extract skills for stored postings that have none.
///
/// Walks the postings in id order, `batch_size` at a time. With `dry_run`
/// the extracted skills are logged and nothing is written.
pub async fn backfill_skills(pool: &PgPool, batch_size: i64, dry_run: bool) -> Result<BackfillReport> {
    let batch_size = batch_size.max(1);
    let candidates = JobPosting::count_without_skills(pool)
        .await
        .context("Failed to count postings without skills")?;
    tracing::info!(candidates, batch_size, dry_run, "Starting skills backfill");

    let mut report = BackfillReport {
        candidates,
        ..Default::default()
    };

    let mut cursor = None;
    loop {
        let batch = JobPosting::find_without_skills(cursor, batch_size, pool)
            .await
            .context("Failed to load postings without skills")?;
        let Some(last) = batch.last() else {
            break;
        };
        cursor = Some(last.id);

        for job in &batch {
            let skills = extract_posting_skills(&job.title, job.description.as_deref());
            if skills.is_empty() {
                report.unchanged += 1;
                continue;
            }

            if dry_run {
                tracing::info!(id = %job.id, skills = ?skills, "Would set skills");
            } else {
                let updated = JobPosting::set_skills(job.id, &skills, pool)
                    .await
                    .with_context(|| format!("Failed to update skills for job {}", job.id))?;
                if updated.is_none() {
                    tracing::debug!(id = %job.id, "Skills already set, skipping");
                    report.unchanged += 1;
                    continue;
                }
            }
            report.updated += 1;
        }

        tracing::debug!(
            updated = report.updated,
            unchanged = report.unchanged,
            "Backfill batch done"
        );
    }

    tracing::info!(
        updated = report.updated,
        unchanged = report.unchanged,
        "Skills backfill complete"
    );
    Ok(report)
}
