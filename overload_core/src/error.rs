//! Error types for the overload_core library.

use crate::{DayStatus, DayType};
use std::io;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], used by transports to pick a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was rejected before touching storage
    Validation,
    /// The request conflicts with the current state of a program or day
    Conflict,
    /// Storage failed; nothing from the operation was committed
    Persistence,
}

/// Core error type for overload_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request payload failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Program {0} not found")]
    ProgramNotFound(Uuid),

    #[error("Program day {0} not found")]
    DayNotFound(Uuid),

    /// The program or day exists but belongs to someone else
    #[error("Program {program_id} is not owned by {owner}")]
    NotOwner { program_id: Uuid, owner: String },

    #[error("Program day {day_id} is already {status}")]
    DayNotPlanned { day_id: Uuid, status: DayStatus },

    #[error("Program day {day_id} is a {actual} day, expected {expected}")]
    DayTypeMismatch {
        day_id: Uuid,
        expected: DayType,
        actual: DayType,
    },

    /// Store-level invariant failure (duplicate id, unreadable record, ...)
    #[error("Store error: {0}")]
    Store(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::ProgramNotFound(_)
            | Error::DayNotFound(_)
            | Error::NotOwner { .. }
            | Error::DayNotPlanned { .. }
            | Error::DayTypeMismatch { .. } => ErrorKind::Conflict,
            Error::Io(_)
            | Error::Json(_)
            | Error::Csv(_)
            | Error::Toml(_)
            | Error::Config(_)
            | Error::Store(_) => ErrorKind::Persistence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::Validation("bad".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::DayNotPlanned {
                day_id: Uuid::nil(),
                status: DayStatus::Done,
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            Error::Store("duplicate".into()).kind(),
            ErrorKind::Persistence
        );
    }

    #[test]
    fn test_conflict_message_names_status() {
        let err = Error::DayNotPlanned {
            day_id: Uuid::nil(),
            status: DayStatus::Skipped,
        };
        assert!(err.to_string().contains("already skipped"));
    }
}
