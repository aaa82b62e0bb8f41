//! Errors raised by domain rules before anything is persisted.
//!
//! Lookup and uniqueness failures come from the repository layer as
//! `AppError`, so only the two cases the domain itself detects live here.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A request broke a domain rule, e.g. mismatched passwords
    #[error("Validation error: {0}")]
    Validation(String),

    /// Password hashing failed
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
