//! Typed ID definitions for all stored entities.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for rows of the `jobs` table.
pub struct JobPostingRow;

/// Marker type for rows of the `ingestion_runs` table.
pub struct IngestionRunRow;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for job postings.
pub type JobPostingId = Id<JobPostingRow>;

/// Typed ID for ingestion run log entries.
pub type IngestionRunId = Id<IngestionRunRow>;

/// Marker type for rows of the `users` table.
pub struct UserRow;

/// Marker type for rows of the `user_job_interactions` table.
pub struct UserJobInteractionRow;

/// Marker type for rows of the `saved_searches` table.
pub struct SavedSearchRow;

pub type UserId = Id<UserRow>;

pub type UserJobInteractionId = Id<UserJobInteractionRow>;

pub type SavedSearchId = Id<SavedSearchRow>;
