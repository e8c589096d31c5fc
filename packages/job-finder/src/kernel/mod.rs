//! Kernel module - process infrastructure and dependencies.

pub mod db;
pub mod deps;
pub mod logging;
pub mod sources;

pub use db::{connect, run_migrations, verify_jobs_schema};
pub use deps::PipelineDeps;
pub use logging::init_logging;
pub use sources::configured_sources;
