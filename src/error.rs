//! Error types for the joseki tutor.

use thiserror::Error;

use crate::board::Color;

/// Main error type for the crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TutorError {
    #[error("malformed record at byte {offset}: {reason}")]
    MalformedRecord { offset: usize, reason: String },

    #[error("invalid coordinate '{value}' in {tag} property (board size {board_size})")]
    InvalidCoordinate {
        tag: String,
        value: String,
        board_size: usize,
    },

    #[error("record contains no move")]
    EmptyRecord,

    #[error("node {node} mixes move colors: expected {expected:?}, found {found:?} in child {child}")]
    InconsistentColor {
        node: usize,
        child: usize,
        expected: Color,
        found: Color,
    },

    #[error("archive {path}: {reason}")]
    Archive { path: String, reason: String },

    #[error("unsupported record source '{path}' (expected .sgf or .zip)")]
    UnsupportedSource { path: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("state file version {found} is not supported (expected {expected})")]
    IncompatibleState { found: u32, expected: u32 },

    #[error("corrupt state file: {reason}")]
    CorruptState { reason: String },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Convenience alias for results using [`TutorError`].
pub type Result<T> = std::result::Result<T, TutorError>;

impl TutorError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        TutorError::MalformedRecord {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        TutorError::Io {
            operation: operation.into(),
            source,
        }
    }
}
