//! Test harness with testcontainers for integration testing.
//!
//! One Postgres container is shared by every test in the binary. Each test
//! gets its own freshly migrated database inside it, so row counts and
//! aggregates never leak between tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use job_finder_core::kernel::run_migrations;
use sqlx::{Connection, PgConnection, PgPool};
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

struct SharedTestInfra {
    host: String,
    port: u16,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();
static NEXT_DATABASE: AtomicUsize = AtomicUsize::new(0);

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let host = postgres.get_host().await?.to_string();
        let port = postgres.get_host_port_ipv4(5432).await?;

        Ok(Self {
            host,
            port,
            _postgres: postgres,
        })
    }

    /// Run one statement on the maintenance database.
    ///
    /// Each test runs on its own runtime, so admin work opens a short-lived
    /// connection instead of sharing a pool.
    async fn admin_execute(&self, statement: &str) -> Result<()> {
        let mut conn = PgConnection::connect(&self.url_for("postgres"))
            .await
            .context("Failed to connect to Postgres")?;
        sqlx::query(statement)
            .execute(&mut conn)
            .await
            .with_context(|| format!("Failed to run: {}", statement))?;
        conn.close().await?;
        Ok(())
    }

    fn url_for(&self, database: &str) -> String {
        database_url(&self.host, self.port, database)
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

fn database_url(host: &str, port: u16, database: &str) -> String {
    format!("postgresql://postgres:postgres@{}:{}/{}", host, port, database)
}

/// Test harness that manages test infrastructure.
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let pool = &ctx.db_pool;
/// }
/// ```
pub struct TestHarness {
    /// Pool on this test's private, migrated database
    pub db_pool: PgPool,
    /// Name of that database, dropped on teardown
    pub database: String,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        if let Err(e) = self.drop_database().await {
            tracing::warn!(error = %e, "Failed to drop test database");
        }
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let database = format!(
            "job_finder_test_{}_{}",
            std::process::id(),
            NEXT_DATABASE.fetch_add(1, Ordering::SeqCst)
        );
        infra
            .admin_execute(&format!("CREATE DATABASE {}", database))
            .await?;

        let db_pool = PgPool::connect(&infra.url_for(&database))
            .await
            .context("Failed to connect to test database")?;
        run_migrations(&db_pool).await?;

        Ok(Self { db_pool, database })
    }

    /// Close the pool and drop this test's database.
    pub async fn drop_database(self) -> Result<()> {
        self.db_pool.close().await;
        SharedTestInfra::get()
            .await
            .admin_execute(&format!("DROP DATABASE IF EXISTS {} WITH (FORCE)", self.database))
            .await
    }

    /// Whether a database with this name exists in the shared container.
    pub async fn database_exists(name: &str) -> Result<bool> {
        let infra = SharedTestInfra::get().await;
        let mut conn = PgConnection::connect(&infra.url_for("postgres"))
            .await
            .context("Failed to connect to Postgres")?;
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)",
        )
        .bind(name)
        .fetch_one(&mut conn)
        .await?;
        conn.close().await?;
        Ok(exists)
    }
}
