//! In-memory repository for task registry tests.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::task::{
    adapters::TaskDocument,
    domain::{Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<TaskDocument>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with a document.
    #[must_use]
    pub fn with_document(document: TaskDocument) -> Self {
        Self {
            state: Arc::new(RwLock::new(document)),
        }
    }
}

fn lock_error(err: impl ToString) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.state.write().map_err(lock_error)?.insert(task)
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.state.write().map_err(lock_error)?.update(task)
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.find(id).cloned())
    }

    async fn list_active(&self) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.active_tasks.clone())
    }

    async fn list_completed(&self) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.completed_tasks.clone())
    }

    async fn archive(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.state.write().map_err(lock_error)?.archive(task)
    }

    async fn remove(&self, id: TaskId) -> TaskRepositoryResult<bool> {
        Ok(self.state.write().map_err(lock_error)?.remove(id))
    }

    async fn clear(&self) -> TaskRepositoryResult<usize> {
        Ok(self.state.write().map_err(lock_error)?.clear())
    }
}
