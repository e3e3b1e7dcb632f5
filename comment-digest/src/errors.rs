//! Crate-wide error hierarchy for comment-digest.
//!
//! - Single root [`Error`] for the pipeline entry points.
//! - [`SchemaError`] fails fast before any oracle call.
//! - [`OracleError`] carries the stage it happened in so the orchestrator can
//!   decide between aborting and degrading.

use std::time::Duration;

use thiserror::Error;

use crate::model::Stage;

/// Convenient alias for crate-wide results.
pub type DigestResult<T> = Result<T, Error>;

/// Root error type for the comment-digest crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The input table is malformed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The oracle failed during a stage that cannot degrade.
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Malformed input table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("row {row} has {cells} cells but the table has {columns} columns")]
    RaggedRow {
        row: usize,
        cells: usize,
        columns: usize,
    },

    #[error("row {row}: column '{column}' holds a nested value")]
    NestedCell { row: usize, column: String },
}

/// Oracle call or reply failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The reply did not match the expected shape.
    #[error("{stage}: invalid oracle reply: {reason}")]
    InvalidReply { stage: Stage, reason: String },

    /// No reply within the per-call deadline.
    #[error("{stage}: oracle timed out after {after:?}")]
    Timeout { stage: Stage, after: Duration },

    /// Network or service failure before any reply.
    #[error("{stage}: oracle transport error: {message}")]
    Transport { stage: Stage, message: String },
}

impl OracleError {
    pub(crate) fn invalid(stage: Stage, reason: impl Into<String>) -> Self {
        OracleError::InvalidReply {
            stage,
            reason: reason.into(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            OracleError::InvalidReply { stage, .. }
            | OracleError::Timeout { stage, .. }
            | OracleError::Transport { stage, .. } => *stage,
        }
    }

    /// Stable machine-readable kind, used in stage statuses and HTTP bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            OracleError::InvalidReply { .. } => "invalid_reply",
            OracleError::Timeout { .. } => "timeout",
            OracleError::Transport { .. } => "transport",
        }
    }
}
