//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Errors raised by structural operations on a [`Silmaril`](crate::domain::Silmaril).
///
/// Every operation that returns one of these leaves the structure unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SilmarilError {
    #[error("no node at depth {depth}, index {index}")]
    NotFound { depth: usize, index: usize },

    #[error("replacement for node at depth {depth}, index {index} has no values")]
    EmptyReplacement { depth: usize, index: usize },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

/// Result type for structural operations.
pub type SilmarilResult<T> = Result<T, SilmarilError>;
