//! Error types for batch-fatal conditions.
//!
//! Per-resource problems are never errors: they surface as
//! `AttemptOutcome::Failed` / `Skipped` inside a `BatchResult`.

use thiserror::Error;

use crate::auth::AuthError;

#[derive(Error, Debug)]
pub enum BulkError {
    #[error("Not authenticated: {0}")]
    Unauthenticated(#[from] AuthError),

    #[error("Move delta must be a non-zero number of minutes")]
    ZeroDelta,

    #[error("Undo store error: {0}")]
    UndoStore(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for engine operations.
pub type BulkResult<T> = Result<T, BulkError>;
