//! Repository port for task persistence.

use crate::task::domain::{Task, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Storage keeps two ordered collections: active tasks and completed tasks.
/// Listing preserves insertion order.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Appends a new task to the active collection.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists in either collection.
    async fn insert(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Replaces an active task in place.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when no active task has the
    /// identifier.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier in either collection.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns active tasks in insertion order.
    async fn list_active(&self) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns completed tasks in completion order.
    async fn list_completed(&self) -> TaskRepositoryResult<Vec<Task>>;

    /// Moves an active task to the completed collection, storing the given
    /// final state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when no active task has the
    /// identifier.
    async fn archive(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Removes an active task. Returns `false` when it did not exist.
    async fn remove(&self, id: TaskId) -> TaskRepositoryResult<bool>;

    /// Removes every task from both collections and returns how many were
    /// dropped.
    async fn clear(&self) -> TaskRepositoryResult<usize>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found among active tasks.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
