pub mod ingestion;
pub mod jobs;
pub mod search;
pub mod skills;
pub mod users;
