use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use typed_builder::TypedBuilder;

use crate::common::UserId;
use crate::domains::jobs::errors::StoreResult;

/// A candidate profile used for recommendations and saved postings
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub target_roles: Vec<String>,
    pub target_companies: Vec<String>,
    pub target_locations: Vec<String>,
    pub min_salary: Option<i32>,
    pub remote_preference: Option<String>, // 'remote', 'hybrid', 'onsite'
    pub experience_level: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NewUser {
    #[builder(default, setter(strip_option))]
    pub email: Option<String>,
    #[builder(default, setter(strip_option))]
    pub name: Option<String>,
    #[builder(default, setter(strip_option))]
    pub location: Option<String>,
    #[builder(default)]
    pub target_roles: Vec<String>,
    #[builder(default)]
    pub target_companies: Vec<String>,
    #[builder(default)]
    pub target_locations: Vec<String>,
    #[builder(default, setter(strip_option))]
    pub min_salary: Option<i32>,
    #[builder(default, setter(strip_option))]
    pub remote_preference: Option<String>,
    #[builder(default, setter(strip_option))]
    pub experience_level: Option<String>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values.into_iter().filter_map(|v| clean(Some(v))).collect()
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl User {
    /// Create a profile. Emails are unique ignoring case; a second profile
    /// with the same email fails with a unique violation.
    pub async fn create(new: NewUser, pool: &PgPool) -> StoreResult<Self> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                email,
                name,
                location,
                target_roles,
                target_companies,
                target_locations,
                min_salary,
                remote_preference,
                experience_level
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(clean(new.email))
        .bind(clean(new.name))
        .bind(clean(new.location))
        .bind(clean_list(new.target_roles))
        .bind(clean_list(new.target_companies))
        .bind(clean_list(new.target_locations))
        .bind(new.min_salary)
        .bind(clean(new.remote_preference))
        .bind(clean(new.experience_level))
        .fetch_one(pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(id: UserId, pool: &PgPool) -> StoreResult<Option<Self>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Look up a profile by email, ignoring case
    pub async fn find_by_email(email: &str, pool: &PgPool) -> StoreResult<Option<Self>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE lower(email) = lower($1)",
        )
        .bind(email.trim())
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    pub async fn touch(id: UserId, pool: &PgPool) -> StoreResult<()> {
        sqlx::query("UPDATE users SET last_active = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
