//! Pipeline dependencies (using traits for testability)

use std::sync::Arc;

use anyhow::Result;
use job_sources::JobSource;
use sqlx::PgPool;

use crate::config::Config;
use crate::kernel::{connect, configured_sources};

/// Everything an ingestion run needs. Tests build this directly with fake
/// sources.
#[derive(Clone)]
pub struct PipelineDeps {
    pub db_pool: PgPool,
    pub sources: Vec<Arc<dyn JobSource>>,
}

impl PipelineDeps {
    pub fn new(db_pool: PgPool, sources: Vec<Arc<dyn JobSource>>) -> Self {
        Self { db_pool, sources }
    }

    /// Connect to the database and build every configured source.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let db_pool = connect(config).await?;
        Ok(Self::new(db_pool, configured_sources(config)))
    }
}
