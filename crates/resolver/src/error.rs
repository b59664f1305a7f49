use storage::error::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Outcome of a knowledge source lookup that produced no usable facts.
///
/// `NotFound` is a confirmed absence and not worth retrying soon;
/// `Transient` covers network faults, non-2xx statuses and malformed payloads.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("No usable data found for '{0}'")]
    NotFound(String),

    #[error("Knowledge source unavailable: {0}")]
    Transient(String),
}

impl SourceError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, SourceError::Transient(_))
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(error: reqwest::Error) -> Self {
        SourceError::Transient(error.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Pick not found")]
    NotFound,

    #[error("Not your pick")]
    Forbidden,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not find data for '{0}'")]
    UpstreamNotFound(String),

    #[error("Knowledge source unavailable, try again later: {0}")]
    UpstreamUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for ResolveError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound => ResolveError::NotFound,
            StorageError::Forbidden => ResolveError::Forbidden,
            StorageError::InvalidInput(msg) => ResolveError::InvalidInput(msg),
            other => ResolveError::Storage(other),
        }
    }
}

impl From<sqlx::Error> for ResolveError {
    fn from(error: sqlx::Error) -> Self {
        ResolveError::Storage(StorageError::Database(error))
    }
}

impl From<SourceError> for ResolveError {
    fn from(error: SourceError) -> Self {
        match error {
            SourceError::NotFound(subject) => ResolveError::UpstreamNotFound(subject),
            SourceError::Transient(msg) => ResolveError::UpstreamUnavailable(msg),
        }
    }
}
