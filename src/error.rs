//! Error types.
//!
//! Only configuration-class problems are errors: they are raised before any
//! cost matrix is built. Data-quality gaps inside a run are counted in
//! [`PassReport`](crate::penalty::PassReport)s instead.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that reject a run before it starts.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid run or policy configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A known policy key carries a value that is not a finite number.
    #[error("Malformed policy entry '{key}': {reason}")]
    MalformedPolicy { key: String, reason: String },

    /// Input pools failed integrity checks.
    #[error("Input validation failed with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),

    /// Both the exact and the fallback solver rejected the matrix.
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result alias for fallible engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Failure of an assignment solver.
///
/// Recoverable: the engine falls back to the greedy solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("Non-finite cost at ({row}, {col})")]
    NonFiniteCost { row: usize, col: usize },

    #[error("Matrix data length {len} does not match {rows}x{cols}")]
    Dimension { rows: usize, cols: usize, len: usize },
}
