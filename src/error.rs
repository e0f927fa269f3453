use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Serialize, Error, Debug, Clone, Eq, PartialEq)]
pub enum ValidationError {
    #[error("Invalid time window. The end ({end}) must be after the start ({start})")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("Meeting duration must be positive, got {minutes} minutes")]
    InvalidDuration { minutes: i64 },
    #[error("Meeting duration of {minutes} minutes exceeds the limit of {limit} minutes")]
    DurationTooLong { minutes: u32, limit: u32 },
    #[error("Time window {start} to {end} is longer than the limit of {limit} minutes")]
    WindowTooLong {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
    },
    #[error("Unsupported length of input. Expected at most {expected}, got {found}")]
    UnsupportedLength { expected: usize, found: usize },
    #[error("Missing required field `{field}`")]
    MissingField { field: &'static str },
}

/// Failure reported by the storage collaborator. The engine never inspects or
/// retries these, it only hands them back to the caller.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct StorageError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> StorageError {
        StorageError {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> StorageError {
        StorageError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} {id} was not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
