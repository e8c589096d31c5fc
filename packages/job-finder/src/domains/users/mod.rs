//! Candidate profiles: skills, saved and hidden postings, saved searches.

pub mod models;

pub use models::*;
