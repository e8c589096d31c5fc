use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use typed_builder::TypedBuilder;

use crate::common::{SavedSearchId, UserId};
use crate::domains::jobs::errors::{StoreResult, ValidationError};
use crate::domains::jobs::JobPosting;
use crate::domains::search::SearchFilters;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotifyFrequency {
    #[default]
    Daily,
    Weekly,
    Instant,
}

impl std::fmt::Display for NotifyFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifyFrequency::Daily => write!(f, "daily"),
            NotifyFrequency::Weekly => write!(f, "weekly"),
            NotifyFrequency::Instant => write!(f, "instant"),
        }
    }
}

impl std::str::FromStr for NotifyFrequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "daily" => Ok(NotifyFrequency::Daily),
            "weekly" => Ok(NotifyFrequency::Weekly),
            "instant" => Ok(NotifyFrequency::Instant),
            _ => Err(anyhow::anyhow!("Invalid notify frequency: {}", s)),
        }
    }
}

/// A named search a user wants to re-run or be notified about
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SavedSearch {
    pub id: SavedSearchId,
    pub user_id: UserId,
    pub name: String,
    pub filters: Json<SearchFilters>,
    pub notify_email: bool,
    pub notify_frequency: String, // 'daily', 'weekly', 'instant'
    pub last_notified: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NewSavedSearch {
    pub user_id: UserId,
    pub name: String,
    #[builder(default)]
    pub filters: SearchFilters,
    #[builder(default = true)]
    pub notify_email: bool,
    #[builder(default)]
    pub notify_frequency: NotifyFrequency,
}

impl SavedSearch {
    pub fn notify_frequency(&self) -> anyhow::Result<NotifyFrequency> {
        self.notify_frequency.parse()
    }

    pub async fn create(new: NewSavedSearch, pool: &PgPool) -> StoreResult<Self> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name").into());
        }

        let search = sqlx::query_as::<_, SavedSearch>(
            r#"
            INSERT INTO saved_searches (user_id, name, filters, notify_email, notify_frequency)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(new.user_id)
        .bind(name)
        .bind(Json(&new.filters))
        .bind(new.notify_email)
        .bind(new.notify_frequency.to_string())
        .fetch_one(pool)
        .await?;
        Ok(search)
    }

    pub async fn find_for_user(user_id: UserId, pool: &PgPool) -> StoreResult<Vec<Self>> {
        let searches = sqlx::query_as::<_, SavedSearch>(
            "SELECT * FROM saved_searches WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(searches)
    }

    /// Delete one of the user's searches. Returns whether a row was removed.
    pub async fn delete(id: SavedSearchId, user_id: UserId, pool: &PgPool) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM saved_searches WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_notified(id: SavedSearchId, pool: &PgPool) -> StoreResult<()> {
        sqlx::query("UPDATE saved_searches SET last_notified = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Run the stored filters against the current postings
    pub async fn run(&self, pool: &PgPool) -> StoreResult<Vec<JobPosting>> {
        JobPosting::search(&self.filters.0, pool).await
    }
}
