//! The engine's single public error type.

use thiserror::Error;

/// Every failure mode the engine can surface to a caller.
///
/// Variants correspond to the error kinds of the execution model: a parse failure never
/// produces a partial result, a row-level evaluation failure during `WHERE` instead drops
/// the row (see [`crate::eval`]) and never reaches this type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed SQL: unexpected token, unbalanced parenthesis, unknown statement keyword.
    #[error("parse error: {0}")]
    Parse(String),

    /// Unknown table, unknown column, or an ambiguous column reference.
    #[error("schema error: {0}")]
    Schema(String),

    /// A function or comparison was applied to a value of the wrong shape.
    #[error("type error: {0}")]
    Type(String),

    /// Underlying file I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Timed out acquiring the per-file exclusive lock.
    #[error("lock error: {0}")]
    Lock(String),

    /// The query deadline elapsed or cancellation was requested.
    #[error("cancelled: {0}")]
    Cancel(String),

    /// UPDATE or DELETE was issued without a WHERE clause.
    #[error("safety error: {0}")]
    Safety(String),

    /// A feature was referenced that this engine does not implement.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Type(err.to_string())
    }
}

impl From<serde_yaml_ng::Error> for EngineError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        Self::Type(err.to_string())
    }
}
