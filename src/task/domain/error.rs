//! Error types for task domain validation and parsing.

use super::TaskId;
use crate::vcs::domain::BranchName;
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The book name is empty after trimming.
    #[error("book must not be empty")]
    EmptyBook,

    /// Module numbers start at 1.
    #[error("invalid module number {0}, expected a positive integer")]
    InvalidModuleNumber(u32),

    /// The checkpoint name is empty after trimming.
    #[error("checkpoint name must not be empty")]
    EmptyCheckpointName,

    /// A different branch is already linked to the task.
    #[error("task {task_id} is already linked to {existing}, refusing {offered}")]
    BranchAlreadyLinked {
        /// Task identifier.
        task_id: TaskId,
        /// Branch currently stored on the task.
        existing: BranchName,
        /// Branch that was offered.
        offered: BranchName,
    },

    /// The target status needs a linked branch.
    #[error("task {task_id} has no branch, cannot enter {status}")]
    BranchRequired {
        /// Task identifier.
        task_id: TaskId,
        /// Requested status.
        status: String,
    },

    /// Transitioning between two statuses is invalid.
    #[error("invalid task status transition for {task_id}: {from} -> {to}")]
    InvalidStateTransition {
        /// Task identifier.
        task_id: TaskId,
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },
}

/// Error returned while parsing task statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task kinds.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task kind: {0}, expected glossary or tests")]
pub struct ParseTaskKindError(pub String);
