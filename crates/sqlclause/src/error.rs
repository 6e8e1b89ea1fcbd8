//! Error types for sqlclause

use thiserror::Error;

/// Result type alias for clause assembly operations
pub type ClauseResult<T> = Result<T, ClauseError>;

/// Error types for clause assembly
#[derive(Debug, Error)]
pub enum ClauseError {
    /// A registration or rendering precondition was violated
    #[error("Precondition violation: {0}")]
    Precondition(String),

    /// Requested features cannot be combined in one statement
    #[error("Incompatible clause combination: {0}")]
    Incompatibility(String),

    /// The active dialect has no rendering for the requested feature
    #[error("Unsupported by dialect: {0}")]
    UnsupportedByDialect(String),

    /// Sub-query indent marks were malformed or unbalanced
    #[error("Sub-query indent error: {0}")]
    SubQueryIndent(String),
}

impl ClauseError {
    /// Create a precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Create an incompatibility error
    pub fn incompatibility(message: impl Into<String>) -> Self {
        Self::Incompatibility(message.into())
    }

    /// Create an unsupported-by-dialect error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedByDialect(message.into())
    }

    /// Check if this is a precondition error
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    /// Check if this is an incompatibility error
    pub fn is_incompatibility(&self) -> bool {
        matches!(self, Self::Incompatibility(_))
    }

    /// Check if this is an unsupported-by-dialect error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedByDialect(_))
    }
}
