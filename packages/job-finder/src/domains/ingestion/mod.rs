//! Fetch, normalize, enrich and store postings from every job source.

pub mod backfill;
pub mod dedup;
pub mod pipeline;

pub use backfill::{backfill_skills, BackfillReport};
pub use dedup::{dedup_postings, DedupPolicy};
pub use pipeline::{
    run_incremental_update, run_pipeline, PipelineOptions, PipelineReport, SourceReport,
    NO_DATA_MESSAGE,
};
