use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use typed_builder::TypedBuilder;

use crate::common::JobPostingId;
use crate::domains::jobs::errors::{StoreResult, ValidationError};
use crate::domains::search::SearchFilters;

/// A stored job posting, one row of the `jobs` table
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobPosting {
    pub id: JobPostingId,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>, // connector name, e.g. 'adzuna'
    pub posting_date: Option<NaiveDate>,
    pub skills: Option<Vec<String>>,
}

/// A posting that has not been stored yet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NewJobPosting {
    pub title: String,
    pub company: String,
    #[builder(default, setter(strip_option))]
    pub location: Option<String>,
    #[builder(default, setter(strip_option))]
    pub description: Option<String>,
    #[builder(default, setter(strip_option))]
    pub url: Option<String>,
    #[builder(default, setter(strip_option))]
    pub source: Option<String>,
    #[builder(default, setter(strip_option))]
    pub posting_date: Option<NaiveDate>,
    #[builder(default, setter(strip_option))]
    pub skills: Option<Vec<String>>,
}

/// A posting with the number of wanted skills it carries
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SkillMatch {
    #[sqlx(flatten)]
    pub job: JobPosting,
    pub matched_skills: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct SkillCount {
    pub skill: String,
    pub job_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillTrend {
    pub skill: String,
    pub total_jobs: i64,
    pub daily_counts: Vec<SkillTrendPoint>,
}

/// Postings carrying a skill on one posting date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct SkillTrendPoint {
    pub day: NaiveDate,
    pub job_count: i64,
}

impl NewJobPosting {
    /// Check the required fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if self.company.trim().is_empty() {
            return Err(ValidationError::MissingField("company"));
        }
        Ok(())
    }

    /// True when there are no skills to store.
    pub fn lacks_skills(&self) -> bool {
        self.skills.as_ref().map_or(true, |skills| {
            skills.iter().all(|skill| skill.trim().is_empty())
        })
    }
}

/// Trim skill tokens, drop blanks and exact duplicates. Order of first
/// appearance is kept.
pub fn normalize_skill_set(skills: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .iter()
        .map(|skill| skill.trim())
        .filter(|skill| !skill.is_empty())
        .filter(|skill| seen.insert(skill.to_string()))
        .map(str::to_string)
        .collect()
}

/// Escape LIKE wildcards so user text is matched literally.
pub(crate) fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl JobPosting {
    /// Validate and insert a posting, returning it with its assigned id.
    ///
    /// Nothing is written when validation fails. Duplicate postings are
    /// accepted and receive distinct ids.
    pub async fn insert(new: NewJobPosting, pool: &PgPool) -> StoreResult<Self> {
        new.validate()?;

        let skills = new.skills.as_deref().map(normalize_skill_set);

        let job = sqlx::query_as::<_, JobPosting>(
            r#"
            INSERT INTO jobs (
                title,
                company,
                location,
                description,
                url,
                source,
                posting_date,
                skills
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new.title.trim())
        .bind(new.company.trim())
        .bind(new.location)
        .bind(new.description)
        .bind(new.url)
        .bind(new.source)
        .bind(new.posting_date)
        .bind(skills)
        .fetch_one(pool)
        .await?;

        Ok(job)
    }

    pub async fn find_by_id(id: JobPostingId, pool: &PgPool) -> StoreResult<Option<Self>> {
        let job = sqlx::query_as::<_, JobPosting>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(job)
    }

    pub async fn count(pool: &PgPool) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM jobs")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Postings dated within the last `days` days, newest first
    pub async fn find_recent(days: i32, limit: i64, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let jobs = sqlx::query_as::<_, JobPosting>(
            r#"
            SELECT * FROM jobs
            WHERE posting_date >= CURRENT_DATE - $1::int
            ORDER BY posting_date DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(days)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(jobs)
    }

    /// Keyword search with optional filters.
    ///
    /// `query` matches title, description or company. Every requested
    /// skill must appear (as a substring) in the posting's skills.
    pub async fn search(filters: &SearchFilters, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let skills: Option<Vec<String>> = filters
            .skill_terms()
            .map(|terms| terms.iter().map(|s| like_pattern(s)).collect());

        let jobs = sqlx::query_as::<_, JobPosting>(
            r#"
            SELECT * FROM jobs
            WHERE ($1::text IS NULL OR title ILIKE $1 OR description ILIKE $1 OR company ILIKE $1)
              AND ($2::text IS NULL OR location ILIKE $2)
              AND ($3::text IS NULL OR company ILIKE $3)
              AND ($4::text[] IS NULL OR NOT EXISTS (
                    SELECT 1 FROM unnest($4::text[]) AS wanted
                    WHERE NOT EXISTS (
                        SELECT 1 FROM unnest(skills) AS skill WHERE skill ILIKE wanted
                    )
                  ))
              AND ($5::text IS NULL OR source = $5)
              AND ($6::int IS NULL OR posting_date >= CURRENT_DATE - $6::int)
            ORDER BY posting_date DESC NULLS LAST, id DESC
            LIMIT $7 OFFSET $8
            "#,
        )
        .bind(filters.query_term().map(like_pattern))
        .bind(filters.location_term().map(like_pattern))
        .bind(filters.company_term().map(like_pattern))
        .bind(skills)
        .bind(filters.source_term())
        .bind(filters.days_old)
        .bind(filters.effective_limit())
        .bind(filters.effective_offset())
        .fetch_all(pool)
        .await?;
        Ok(jobs)
    }

    /// Postings sharing at least one skill with `skills`, compared
    /// case-insensitively, most overlapping skills first.
    pub async fn find_matching_skills(
        skills: &[String],
        limit: i64,
        pool: &PgPool,
    ) -> StoreResult<Vec<SkillMatch>> {
        let wanted: Vec<String> = skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let matches = sqlx::query_as::<_, SkillMatch>(
            r#"
            SELECT j.*, m.matched_skills
            FROM jobs j
            CROSS JOIN LATERAL (
                SELECT COUNT(DISTINCT lower(skill)) AS matched_skills
                FROM unnest(j.skills) AS skill
                WHERE lower(skill) = ANY($1)
            ) m
            WHERE m.matched_skills > 0
            ORDER BY m.matched_skills DESC, j.id DESC
            LIMIT $2
            "#,
        )
        .bind(wanted)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(matches)
    }

    /// Most common skills across all postings. Spellings that differ only
    /// in case count as one skill.
    pub async fn top_skills(limit: i64, pool: &PgPool) -> StoreResult<Vec<SkillCount>> {
        let counts = sqlx::query_as::<_, SkillCount>(
            r#"
            SELECT min(skill) AS skill, COUNT(DISTINCT jobs.id) AS job_count
            FROM jobs, unnest(skills) AS skill
            GROUP BY lower(skill)
            ORDER BY job_count DESC, min(skill) ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(counts)
    }

    /// Postings carrying one skill: the all-time total and daily counts over
    /// the last `days` days
    pub async fn skill_trend(skill: &str, days: i32, pool: &PgPool) -> StoreResult<SkillTrend> {
        let skill = skill.trim();

        let total_jobs = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM jobs
            WHERE EXISTS (SELECT 1 FROM unnest(skills) AS s WHERE lower(s) = lower($1))
            "#,
        )
        .bind(skill)
        .fetch_one(pool)
        .await?;

        let daily_counts = sqlx::query_as::<_, SkillTrendPoint>(
            r#"
            SELECT posting_date AS day, COUNT(*) AS job_count
            FROM jobs
            WHERE posting_date >= CURRENT_DATE - $2::int
              AND EXISTS (SELECT 1 FROM unnest(skills) AS s WHERE lower(s) = lower($1))
            GROUP BY posting_date
            ORDER BY posting_date ASC
            "#,
        )
        .bind(skill)
        .bind(days)
        .fetch_all(pool)
        .await?;

        Ok(SkillTrend {
            skill: skill.to_string(),
            total_jobs,
            daily_counts,
        })
    }

    /// Every URL already stored, for incremental ingestion
    pub async fn existing_urls(pool: &PgPool) -> StoreResult<HashSet<String>> {
        let urls = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT url FROM jobs WHERE url IS NOT NULL",
        )
        .fetch_all(pool)
        .await?;
        Ok(urls.into_iter().collect())
    }

    /// Postings with no skills recorded, in id order after `after`
    pub async fn find_without_skills(
        after: Option<JobPostingId>,
        limit: i64,
        pool: &PgPool,
    ) -> StoreResult<Vec<Self>> {
        let jobs = sqlx::query_as::<_, JobPosting>(
            r#"
            SELECT * FROM jobs
            WHERE (skills IS NULL OR cardinality(skills) = 0)
              AND ($1::int IS NULL OR id > $1)
            ORDER BY id ASC
            LIMIT $2
            "#,
        )
        .bind(after)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(jobs)
    }

    pub async fn count_without_skills(pool: &PgPool) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM jobs WHERE skills IS NULL OR cardinality(skills) = 0",
        )
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Fill in the skills of one posting that has none (skills backfill).
    ///
    /// Returns `None`, writing nothing, when the posting does not exist or
    /// already carries skills.
    pub async fn set_skills(
        id: JobPostingId,
        skills: &[String],
        pool: &PgPool,
    ) -> StoreResult<Option<Self>> {
        let job = sqlx::query_as::<_, JobPosting>(
            r#"
            UPDATE jobs SET skills = $1
            WHERE id = $2 AND (skills IS NULL OR cardinality(skills) = 0)
            RETURNING *
            "#,
        )
        .bind(normalize_skill_set(skills))
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(job)
    }
}
