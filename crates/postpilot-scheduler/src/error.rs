//! Error types for registry operations.

use thiserror::Error;

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors surfaced by the scheduling registry.
///
/// These always propagate to the caller; they indicate caller mistakes
/// (bad input, unknown id) or missing collaborators, never transient
/// conditions worth retrying silently.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid job: {0}")]
    Validation(String),

    #[error("job not found: {0}")]
    NotFound(String),

    #[error("cron schedules are not supported without an evaluator")]
    UnsupportedSchedule,

    #[error("invalid cron expression: {0}")]
    InvalidCronExpression(String),

    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("SQLite error: {0}")]
    Storage(#[from] rusqlite::Error),
}
