use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{JobPostingId, UserId, UserJobInteractionId};
use crate::domains::jobs::errors::{StoreResult, ValidationError};
use crate::domains::jobs::JobPosting;

/// What a user did with a posting. Flags only ever switch on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Interaction {
    Viewed,
    Saved,
    Applied,
    Hidden,
}

/// A user's history with one posting; at most one row per pair
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserJobInteraction {
    pub id: UserJobInteractionId,
    pub user_id: UserId,
    pub job_id: JobPostingId,
    pub viewed: bool,
    pub saved: bool,
    pub applied: bool,
    pub hidden: bool,
    pub viewed_at: Option<DateTime<Utc>>,
    pub saved_at: Option<DateTime<Utc>>,
    pub applied_at: Option<DateTime<Utc>>,
    pub rating: Option<i32>, // 1-5
    pub notes: Option<String>,
}

impl UserJobInteraction {
    /// Record an interaction, creating the row on first contact. Repeating
    /// an interaction refreshes its timestamp.
    pub async fn record(
        user_id: UserId,
        job_id: JobPostingId,
        interaction: Interaction,
        pool: &PgPool,
    ) -> StoreResult<Self> {
        let row = sqlx::query_as::<_, UserJobInteraction>(
            r#"
            INSERT INTO user_job_interactions (
                user_id, job_id,
                viewed, viewed_at,
                saved, saved_at,
                applied, applied_at,
                hidden
            ) VALUES (
                $1, $2,
                $3, CASE WHEN $3 THEN NOW() END,
                $4, CASE WHEN $4 THEN NOW() END,
                $5, CASE WHEN $5 THEN NOW() END,
                $6
            )
            ON CONFLICT (user_id, job_id) DO UPDATE SET
                viewed = user_job_interactions.viewed OR EXCLUDED.viewed,
                viewed_at = COALESCE(EXCLUDED.viewed_at, user_job_interactions.viewed_at),
                saved = user_job_interactions.saved OR EXCLUDED.saved,
                saved_at = COALESCE(EXCLUDED.saved_at, user_job_interactions.saved_at),
                applied = user_job_interactions.applied OR EXCLUDED.applied,
                applied_at = COALESCE(EXCLUDED.applied_at, user_job_interactions.applied_at),
                hidden = user_job_interactions.hidden OR EXCLUDED.hidden
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(job_id)
        .bind(interaction == Interaction::Viewed)
        .bind(interaction == Interaction::Saved)
        .bind(interaction == Interaction::Applied)
        .bind(interaction == Interaction::Hidden)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    pub async fn save_job(
        user_id: UserId,
        job_id: JobPostingId,
        pool: &PgPool,
    ) -> StoreResult<Self> {
        Self::record(user_id, job_id, Interaction::Saved, pool).await
    }

    /// Remove a posting from the saved list. Returns `None` if it was never
    /// touched by this user.
    pub async fn unsave_job(
        user_id: UserId,
        job_id: JobPostingId,
        pool: &PgPool,
    ) -> StoreResult<Option<Self>> {
        let row = sqlx::query_as::<_, UserJobInteraction>(
            r#"
            UPDATE user_job_interactions
            SET saved = FALSE, saved_at = NULL
            WHERE user_id = $1 AND job_id = $2
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(job_id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    /// Rate a posting 1-5 with optional notes
    pub async fn rate(
        user_id: UserId,
        job_id: JobPostingId,
        rating: i32,
        notes: Option<String>,
        pool: &PgPool,
    ) -> StoreResult<Self> {
        if !(1..=5).contains(&rating) {
            return Err(ValidationError::InvalidRating(rating).into());
        }

        let row = sqlx::query_as::<_, UserJobInteraction>(
            r#"
            INSERT INTO user_job_interactions (user_id, job_id, rating, notes)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, job_id) DO UPDATE SET
                rating = EXCLUDED.rating,
                notes = COALESCE(EXCLUDED.notes, user_job_interactions.notes)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(job_id)
        .bind(rating)
        .bind(notes)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    pub async fn find(
        user_id: UserId,
        job_id: JobPostingId,
        pool: &PgPool,
    ) -> StoreResult<Option<Self>> {
        let row = sqlx::query_as::<_, UserJobInteraction>(
            "SELECT * FROM user_job_interactions WHERE user_id = $1 AND job_id = $2",
        )
        .bind(user_id)
        .bind(job_id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    /// Postings the user saved, most recently saved first
    pub async fn saved_jobs(
        user_id: UserId,
        limit: i64,
        pool: &PgPool,
    ) -> StoreResult<Vec<JobPosting>> {
        let jobs = sqlx::query_as::<_, JobPosting>(
            r#"
            SELECT j.*
            FROM jobs j
            JOIN user_job_interactions i ON i.job_id = j.id
            WHERE i.user_id = $1 AND i.saved
            ORDER BY i.saved_at DESC NULLS LAST, j.id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(jobs)
    }
}
