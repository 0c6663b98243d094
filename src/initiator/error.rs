//! Errors returned to front ends.

use crate::catalog::CatalogError;
use crate::task::domain::{ModuleKey, TaskId, TaskKind};
use crate::task::services::TaskRegistryError;
use crate::vcs::domain::MergeStep;
use thiserror::Error;

/// Errors raised by initiator operations.
#[derive(Debug, Error)]
pub enum InitiatorError {
    /// The book or module is not in the catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The registry rejected the operation.
    #[error(transparent)]
    Registry(#[from] TaskRegistryError),

    /// The module does not have exactly one ready glossary and tests task.
    #[error("{module} is not ready to merge")]
    ModuleNotReady {
        /// Requested module.
        module: ModuleKey,
    },

    /// A ready task has no branch.
    #[error("task {task_id} has no linked branch")]
    MissingBranch {
        /// Offending task.
        task_id: TaskId,
    },

    /// The merge procedure stopped at a step.
    #[error("merge of {module} failed at {step}: {message}")]
    Merge {
        /// Module being merged.
        module: ModuleKey,
        /// Step that failed.
        step: MergeStep,
        /// Underlying failure.
        message: String,
        /// Steps completed before the failure.
        steps: Vec<String>,
    },

    /// The prompt template failed to render.
    #[error("failed to render {kind} prompt: {reason}")]
    TemplateRender {
        /// Task kind.
        kind: TaskKind,
        /// Renderer message.
        reason: String,
    },
}

/// Result type for initiator operations.
pub type InitiatorResult<T> = Result<T, InitiatorError>;
