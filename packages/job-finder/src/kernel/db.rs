use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;

/// Open a connection pool sized from configuration.
pub async fn connect(config: &Config) -> Result<PgPool> {
    tracing::info!(
        max_connections = config.db_max_connections,
        "Connecting to database..."
    );
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");
    Ok(pool)
}

/// Apply the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");
    Ok(())
}

/// Column layout of the `jobs` table: name, data type, nullable.
pub const JOBS_COLUMNS: [(&str, &str, bool); 9] = [
    ("id", "integer", false),
    ("title", "text", false),
    ("company", "text", false),
    ("location", "text", true),
    ("description", "text", true),
    ("url", "text", true),
    ("source", "text", true),
    ("posting_date", "date", true),
    ("skills", "ARRAY", true),
];

#[derive(sqlx::FromRow)]
struct ColumnInfo {
    column_name: String,
    data_type: String,
    is_nullable: String,
}

/// Compare the live `jobs` table against [`JOBS_COLUMNS`].
///
/// Returns one message per mismatch; an empty list means the layout is exact.
pub async fn verify_jobs_schema(pool: &PgPool) -> Result<Vec<String>> {
    let columns = sqlx::query_as::<_, ColumnInfo>(
        r#"
        SELECT column_name::text AS column_name,
               data_type::text AS data_type,
               is_nullable::text AS is_nullable
        FROM information_schema.columns
        WHERE table_schema = current_schema() AND table_name = 'jobs'
        ORDER BY ordinal_position
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to read jobs table layout")?;

    if columns.is_empty() {
        return Ok(vec!["jobs table does not exist".to_string()]);
    }

    let mut problems = Vec::new();
    if columns.len() != JOBS_COLUMNS.len() {
        problems.push(format!(
            "expected {} columns, found {}",
            JOBS_COLUMNS.len(),
            columns.len()
        ));
    }

    for (actual, (name, data_type, nullable)) in columns.iter().zip(JOBS_COLUMNS) {
        if actual.column_name != name {
            problems.push(format!("expected column {}, found {}", name, actual.column_name));
            continue;
        }
        if actual.data_type != data_type {
            problems.push(format!(
                "column {} has type {}, expected {}",
                name, actual.data_type, data_type
            ));
        }
        if (actual.is_nullable == "YES") != nullable {
            problems.push(format!(
                "column {} nullability is {}, expected {}",
                name,
                actual.is_nullable,
                if nullable { "YES" } else { "NO" }
            ));
        }
    }

    Ok(problems)
}
