//! Keyword search and skill-based recommendation over stored postings.

pub mod filters;

pub use filters::*;

use sqlx::PgPool;

use crate::common::UserId;
use crate::domains::jobs::{JobPosting, SkillMatch, StoreResult};
use crate::domains::users::UserSkill;

pub const DEFAULT_RECOMMEND_LIMIT: i64 = 10;

/// Run a keyword search.
pub async fn search_jobs(filters: &SearchFilters, pool: &PgPool) -> StoreResult<Vec<JobPosting>> {
    let jobs = JobPosting::search(filters, pool).await?;
    tracing::debug!(
        query = ?filters.query_term(),
        results = jobs.len(),
        "Job search complete"
    );
    Ok(jobs)
}

/// Postings that share at least one skill with a candidate profile.
///
/// Skills compare case-insensitively. Postings matching more of the
/// profile rank first. An empty profile matches nothing.
pub async fn recommend_jobs(
    profile_skills: &[String],
    limit: i64,
    pool: &PgPool,
) -> StoreResult<Vec<SkillMatch>> {
    let limit = limit.clamp(1, MAX_SEARCH_LIMIT);
    let matches = JobPosting::find_matching_skills(profile_skills, limit, pool).await?;
    tracing::debug!(
        skills = profile_skills.len(),
        results = matches.len(),
        "Job recommendation complete"
    );
    Ok(matches)
}

/// Recommendations driven by a stored user's skill profile.
pub async fn recommend_jobs_for_user(
    user_id: UserId,
    limit: i64,
    pool: &PgPool,
) -> StoreResult<Vec<SkillMatch>> {
    let skills = UserSkill::names_for_user(user_id, pool).await?;
    if skills.is_empty() {
        tracing::debug!(user_id = %user_id, "User has no skills, nothing to recommend");
        return Ok(Vec::new());
    }
    recommend_jobs(&skills, limit, pool).await
}
