use thiserror::Error;

/// A record rejected before it reaches the database
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required and must not be blank")]
    MissingField(&'static str),

    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(i32),
}

/// Errors from the record store
#[derive(Error, Debug)]
pub enum JobStoreError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl JobStoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, JobStoreError::Validation(_))
    }

    /// A unique constraint rejected the write (e.g. an email already in use)
    pub fn is_unique_violation(&self) -> bool {
        match self {
            JobStoreError::Database(sqlx::Error::Database(e)) => e.is_unique_violation(),
            _ => false,
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, JobStoreError>;
