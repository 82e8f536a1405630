//! Error types for routine-tui.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::routine::{Frequency, RoutineId};

/// Rejected routine input. The collection is never touched when one of
/// these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("time must be HH:MM (24-hour), got '{0}'")]
    InvalidTimeFormat(String),

    #[error("unknown frequency '{0}'")]
    InvalidFrequency(String),
}

/// The mutation gate refused an edit or delete on the selected date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{frequency} routine cannot be changed on {date}")]
pub struct MutationNotPermitted {
    pub id: RoutineId,
    pub frequency: Frequency,
    pub date: NaiveDate,
}

/// Failures of the persisted routine document.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read routine store at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("routine store at {} could not be parsed: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("routine store at {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("failed to write routine store at {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode routine store: {0}")]
    Encode(#[source] serde_json::Error),
}

impl StoreError {
    /// True for failures that happened while loading an existing document.
    pub fn is_read_error(&self) -> bool {
        matches!(
            self,
            StoreError::Read { .. } | StoreError::Parse { .. } | StoreError::Corrupt { .. }
        )
    }

    /// True for failures that lost a save.
    pub fn is_write_error(&self) -> bool {
        matches!(self, StoreError::Write { .. } | StoreError::Encode(_))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid log level '{level}': {source}")]
    Level {
        level: String,
        #[source]
        source: flexi_logger::FlexiLoggerError,
    },

    #[error("failed to start logger: {0}")]
    Start(#[source] flexi_logger::FlexiLoggerError),
}

/// Umbrella error for operations that touch the collection.
#[derive(Error, Debug)]
pub enum RoutineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotPermitted(#[from] MutationNotPermitted),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("routine {0} not found")]
    NotFound(RoutineId),
}

pub type RoutineResult<T> = Result<T, RoutineError>;
