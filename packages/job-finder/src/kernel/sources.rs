use std::sync::Arc;

use job_sources::{AdzunaClient, JobSource, JobsPikrClient, UsaJobsClient, ZipRecruiterClient};

use crate::config::Config;

/// Every supported job board, in fetch order.
///
/// Sources without credentials are still returned; they log a warning and
/// yield nothing when fetched.
pub fn configured_sources(config: &Config) -> Vec<Arc<dyn JobSource>> {
    let sources: Vec<Arc<dyn JobSource>> = vec![
        Arc::new(
            AdzunaClient::new(config.adzuna_app_id.clone(), config.adzuna_app_key.clone())
                .with_country(config.adzuna_country.clone()),
        ),
        Arc::new(ZipRecruiterClient::new(config.ziprecruiter_api_key.clone())),
        Arc::new(UsaJobsClient::new(
            config.usajobs_api_key.clone(),
            config.usajobs_user_agent.clone(),
        )),
        Arc::new(JobsPikrClient::new(config.jobspikr_api_key.clone())),
    ];

    for source in &sources {
        if !source.is_configured() {
            tracing::debug!(source = source.source_name(), "Job source has no credentials");
        }
    }

    sources
}
