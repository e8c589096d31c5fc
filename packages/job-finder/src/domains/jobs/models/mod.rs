pub mod ingestion_run;
pub mod job_posting;

pub use ingestion_run::*;
pub use job_posting::*;
