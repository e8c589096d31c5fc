use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use typed_builder::TypedBuilder;

use crate::common::UserId;
use crate::domains::jobs::errors::StoreResult;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Expert,
}

impl std::fmt::Display for Proficiency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Proficiency::Beginner => write!(f, "beginner"),
            Proficiency::Intermediate => write!(f, "intermediate"),
            Proficiency::Expert => write!(f, "expert"),
        }
    }
}

impl std::str::FromStr for Proficiency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "beginner" => Ok(Proficiency::Beginner),
            "intermediate" => Ok(Proficiency::Intermediate),
            "expert" => Ok(Proficiency::Expert),
            _ => Err(anyhow::anyhow!("Invalid proficiency level: {}", s)),
        }
    }
}

/// One skill on a user's profile
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSkill {
    pub user_id: UserId,
    pub skill: String,
    pub proficiency_level: Option<String>, // 'beginner', 'intermediate', 'expert'
    pub years_experience: Option<i32>,
    pub last_used: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NewUserSkill {
    pub skill: String,
    #[builder(default, setter(strip_option))]
    pub proficiency_level: Option<Proficiency>,
    #[builder(default, setter(strip_option))]
    pub years_experience: Option<i32>,
    #[builder(default, setter(strip_option))]
    pub last_used: Option<NaiveDate>,
}

impl From<&str> for NewUserSkill {
    fn from(skill: &str) -> Self {
        NewUserSkill::builder().skill(skill).build()
    }
}

/// Trim names, drop blanks, keep the first of skills that differ only in case.
fn dedup_skills(skills: Vec<NewUserSkill>) -> Vec<NewUserSkill> {
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .filter_map(|mut s| {
            s.skill = s.skill.trim().to_string();
            (!s.skill.is_empty() && seen.insert(s.skill.to_lowercase())).then_some(s)
        })
        .collect()
}

impl UserSkill {
    /// Replace a user's whole skill profile in one transaction.
    pub async fn replace_for_user(
        user_id: UserId,
        skills: Vec<NewUserSkill>,
        pool: &PgPool,
    ) -> StoreResult<Vec<Self>> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM user_skills WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let mut stored = Vec::new();
        for skill in dedup_skills(skills) {
            let row = sqlx::query_as::<_, UserSkill>(
                r#"
                INSERT INTO user_skills (user_id, skill, proficiency_level, years_experience, last_used)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                "#,
            )
            .bind(user_id)
            .bind(skill.skill)
            .bind(skill.proficiency_level.map(|p| p.to_string()))
            .bind(skill.years_experience)
            .bind(skill.last_used)
            .fetch_one(&mut *tx)
            .await?;
            stored.push(row);
        }

        tx.commit().await?;
        Ok(stored)
    }

    pub async fn find_for_user(user_id: UserId, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let skills = sqlx::query_as::<_, UserSkill>(
            "SELECT * FROM user_skills WHERE user_id = $1 ORDER BY lower(skill)",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(skills)
    }

    /// Skill names only, for matching against postings
    pub async fn names_for_user(user_id: UserId, pool: &PgPool) -> StoreResult<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT skill FROM user_skills WHERE user_id = $1 ORDER BY lower(skill)",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(names)
    }
}
