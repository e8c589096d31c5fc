// Job Finder - Core
//
// Ingests postings from external job boards, normalizes them, extracts
// skills, stores them in Postgres, and serves keyword search over them.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
