//! Error types for branch and commit value validation.

use thiserror::Error;

/// Errors returned while constructing VCS domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VcsDomainError {
    /// The branch name is invalid.
    #[error("invalid branch name '{0}', expected a non-empty ref without whitespace")]
    InvalidBranchName(String),
}
