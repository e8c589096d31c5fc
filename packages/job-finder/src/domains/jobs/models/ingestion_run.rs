use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use typed_builder::TypedBuilder;

use crate::common::IngestionRunId;
use crate::domains::jobs::errors::StoreResult;

/// Source name used for the summary row written at the end of a pipeline run.
pub const PIPELINE_COMPLETE_SOURCE: &str = "pipeline_complete";

/// One logged ingestion attempt
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct IngestionRun {
    pub id: IngestionRunId,
    pub source: String,
    pub status: String, // 'completed', 'no_data', 'failed'
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub jobs_fetched: i32,
    pub jobs_inserted: i32,
    pub jobs_skipped: i32,
    pub jobs_failed: i32,
    pub error_message: Option<String>,
    pub duration_seconds: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    NoData,
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::NoData => write!(f, "no_data"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for RunStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "completed" => Ok(RunStatus::Completed),
            "no_data" => Ok(RunStatus::NoData),
            "failed" => Ok(RunStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid ingestion run status: {}", s)),
        }
    }
}

/// A run to be logged
#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NewIngestionRun {
    pub source: String,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    #[builder(default = Some(Utc::now()), setter(strip_option))]
    pub completed_at: Option<DateTime<Utc>>,
    #[builder(default)]
    pub jobs_fetched: i32,
    #[builder(default)]
    pub jobs_inserted: i32,
    #[builder(default)]
    pub jobs_skipped: i32,
    #[builder(default)]
    pub jobs_failed: i32,
    #[builder(default, setter(strip_option))]
    pub error_message: Option<String>,
}

/// Aggregate over logged runs in a time window
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestionStats {
    pub total_runs: i64,
    pub successful_runs: i64,
    pub failed_runs: i64,
    pub total_jobs_fetched: i64,
    pub total_jobs_inserted: i64,
    pub by_source: BTreeMap<String, SourceRunStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, sqlx::FromRow)]
pub struct SourceRunStats {
    pub runs: i64,
    pub jobs_fetched: i64,
    pub jobs_inserted: i64,
}

#[derive(sqlx::FromRow)]
struct SourceRunRow {
    source: String,
    runs: i64,
    successful_runs: i64,
    failed_runs: i64,
    jobs_fetched: i64,
    jobs_inserted: i64,
}

impl IngestionRun {
    pub fn status(&self) -> anyhow::Result<RunStatus> {
        self.status.parse()
    }

    pub async fn record(run: NewIngestionRun, pool: &PgPool) -> StoreResult<Self> {
        let duration_seconds = run
            .completed_at
            .map(|done| (done - run.started_at).num_milliseconds() as f64 / 1000.0);

        let row = sqlx::query_as::<_, IngestionRun>(
            r#"
            INSERT INTO ingestion_runs (
                source,
                status,
                started_at,
                completed_at,
                jobs_fetched,
                jobs_inserted,
                jobs_skipped,
                jobs_failed,
                error_message,
                duration_seconds
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(run.source)
        .bind(run.status.to_string())
        .bind(run.started_at)
        .bind(run.completed_at)
        .bind(run.jobs_fetched)
        .bind(run.jobs_inserted)
        .bind(run.jobs_skipped)
        .bind(run.jobs_failed)
        .bind(run.error_message)
        .bind(duration_seconds)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }

    /// Most recent runs, newest first
    pub async fn find_recent(limit: i64, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let runs = sqlx::query_as::<_, IngestionRun>(
            "SELECT * FROM ingestion_runs ORDER BY started_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(runs)
    }

    /// Aggregate runs started within the last `days` days
    pub async fn stats_since(days: i32, pool: &PgPool) -> StoreResult<IngestionStats> {
        let rows = sqlx::query_as::<_, SourceRunRow>(
            r#"
            SELECT
                source,
                COUNT(*) AS runs,
                COUNT(*) FILTER (WHERE status = 'completed') AS successful_runs,
                COUNT(*) FILTER (WHERE status = 'failed') AS failed_runs,
                COALESCE(SUM(jobs_fetched), 0)::bigint AS jobs_fetched,
                COALESCE(SUM(jobs_inserted), 0)::bigint AS jobs_inserted
            FROM ingestion_runs
            WHERE started_at >= NOW() - make_interval(days => $1)
            GROUP BY source
            "#,
        )
        .bind(days)
        .fetch_all(pool)
        .await?;

        let mut stats = IngestionStats::default();
        for row in rows {
            stats.total_runs += row.runs;
            stats.successful_runs += row.successful_runs;
            stats.failed_runs += row.failed_runs;
            stats.total_jobs_fetched += row.jobs_fetched;
            stats.total_jobs_inserted += row.jobs_inserted;
            stats.by_source.insert(
                row.source,
                SourceRunStats {
                    runs: row.runs,
                    jobs_fetched: row.jobs_fetched,
                    jobs_inserted: row.jobs_inserted,
                },
            );
        }

        Ok(stats)
    }
}
