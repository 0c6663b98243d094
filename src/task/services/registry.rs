//! Task registry service.
//!
//! All mutations are serialised through one async mutex so that concurrent
//! callers (the reconciliation loop and operator commands) never interleave
//! their load-modify-save cycles.

use crate::task::{
    domain::{
        LinkOutcome, ModuleGroupId, ModuleKey, Task, TaskDomainError, TaskId, TaskKind,
        TaskStatus, module_ready,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use crate::vcs::domain::BranchName;
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Service-level errors for registry operations.
#[derive(Debug, Error)]
pub enum TaskRegistryError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

/// Result type for registry operations.
pub type TaskRegistryResult<T> = Result<T, TaskRegistryError>;

/// Identifiers of a freshly created glossary/tests pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModulePair {
    /// Shared group identifier.
    pub group_id: ModuleGroupId,
    /// Glossary task.
    pub glossary_id: TaskId,
    /// Tests task.
    pub tests_id: TaskId,
}

/// Durable store of task records.
pub struct TaskRegistry<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    write_lock: Mutex<()>,
}

impl<R, C> TaskRegistry<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new registry service.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the clock the registry stamps records with.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Creates an unlinked task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Domain`] for an empty book or module zero,
    /// and [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn create_task(
        &self,
        kind: TaskKind,
        book: &str,
        module: u32,
        group: Option<ModuleGroupId>,
    ) -> TaskRegistryResult<Task> {
        let key = ModuleKey::new(book, module)?;
        let task = Task::new(kind, &key, group, &*self.clock);

        let _guard = self.write_lock.lock().await;
        self.repository.insert(&task).await?;
        info!(task_id = %task.id(), %kind, %key, "created task");
        Ok(task)
    }

    /// Creates the glossary and tests tasks of a module under one group.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError`] when validation or persistence fails.
    pub async fn create_module_pair(&self, book: &str, module: u32) -> TaskRegistryResult<ModulePair> {
        let group_id = ModuleGroupId::new();
        let glossary = self
            .create_task(TaskKind::Glossary, book, module, Some(group_id))
            .await?;
        let tests = self
            .create_task(TaskKind::Tests, book, module, Some(group_id))
            .await?;
        info!(%group_id, book, module, "created module pair");
        Ok(ModulePair {
            group_id,
            glossary_id: glossary.id(),
            tests_id: tests.id(),
        })
    }

    /// Links a branch to an active task.
    ///
    /// Returns `false` when the task does not exist or already holds a
    /// different branch; the stored branch is never overwritten. Linking the
    /// same branch again returns `true` without changes.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn link_branch(&self, id: TaskId, branch: BranchName) -> TaskRegistryResult<bool> {
        let _guard = self.write_lock.lock().await;
        let Some(mut task) = self.find_active(id).await? else {
            return Ok(false);
        };

        match task.link_branch(branch, &*self.clock) {
            Ok(LinkOutcome::AlreadyLinked) => Ok(true),
            Ok(LinkOutcome::Linked) => {
                self.repository.update(&task).await?;
                if let Some(linked) = task.branch() {
                    info!(task_id = %id, branch = %linked, "linked branch");
                }
                Ok(true)
            }
            Err(err @ TaskDomainError::BranchAlreadyLinked { .. }) => {
                warn!(task_id = %id, %err, "refused to relink task");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Appends a checkpoint to an active task. Returns `false` when the task
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError`] for a blank name or persistence failure.
    pub async fn append_checkpoint(&self, id: TaskId, name: &str) -> TaskRegistryResult<bool> {
        let _guard = self.write_lock.lock().await;
        let Some(mut task) = self.find_active(id).await? else {
            return Ok(false);
        };
        task.append_checkpoint(name, &*self.clock)?;
        self.repository.update(&task).await?;
        info!(task_id = %id, checkpoint = name, "recorded checkpoint");
        Ok(true)
    }

    /// Moves an active task to `status`. Returns `false` when the task does
    /// not exist.
    ///
    /// Setting [`TaskStatus::Completed`] also archives the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Domain`] for a forbidden transition and
    /// [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn set_status(&self, id: TaskId, status: TaskStatus) -> TaskRegistryResult<bool> {
        let _guard = self.write_lock.lock().await;
        let Some(mut task) = self.find_active(id).await? else {
            return Ok(false);
        };
        let from = task.status();
        task.transition_to(status, &*self.clock)?;
        if status == TaskStatus::Completed {
            self.repository.archive(&task).await?;
        } else {
            self.repository.update(&task).await?;
        }
        info!(task_id = %id, %from, to = %status, "changed task status");
        Ok(true)
    }

    /// Marks a linked task as ready to merge.
    ///
    /// # Errors
    ///
    /// See [`Self::set_status`].
    pub async fn mark_ready(&self, id: TaskId) -> TaskRegistryResult<bool> {
        self.set_status(id, TaskStatus::ReadyToMerge).await
    }

    /// Completes an active task and moves it to the completed collection.
    ///
    /// # Errors
    ///
    /// See [`Self::set_status`].
    pub async fn complete(&self, id: TaskId) -> TaskRegistryResult<bool> {
        self.set_status(id, TaskStatus::Completed).await
    }

    /// Removes an active task. Returns `false` when it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn remove(&self, id: TaskId) -> TaskRegistryResult<bool> {
        let _guard = self.write_lock.lock().await;
        let removed = self.repository.remove(id).await?;
        if removed {
            info!(task_id = %id, "removed task");
        }
        Ok(removed)
    }

    /// Drops every task from both collections.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn clear_all(&self) -> TaskRegistryResult<usize> {
        let _guard = self.write_lock.lock().await;
        let dropped = self.repository.clear().await?;
        info!(dropped, "cleared task registry");
        Ok(dropped)
    }

    /// Finds a task in either collection.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn get(&self, id: TaskId) -> TaskRegistryResult<Option<Task>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Finds the active task linked to `branch`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn find_by_branch(&self, branch: &BranchName) -> TaskRegistryResult<Option<Task>> {
        let active = self.repository.list_active().await?;
        Ok(active.into_iter().find(|task| task.branch() == Some(branch)))
    }

    /// Returns active tasks in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn list_active(&self) -> TaskRegistryResult<Vec<Task>> {
        Ok(self.repository.list_active().await?)
    }

    /// Returns completed tasks in completion order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn list_completed(&self) -> TaskRegistryResult<Vec<Task>> {
        Ok(self.repository.list_completed().await?)
    }

    /// Returns tasks completed on the given UTC calendar date.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn list_completed_on(&self, date: NaiveDate) -> TaskRegistryResult<Vec<Task>> {
        let completed = self.repository.list_completed().await?;
        Ok(completed
            .into_iter()
            .filter(|task| task.completed_at().is_some_and(|at| at.date_naive() == date))
            .collect())
    }

    /// Returns every task sharing `group`, active first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn list_by_group(&self, group: ModuleGroupId) -> TaskRegistryResult<Vec<Task>> {
        let active = self.repository.list_active().await?;
        let completed = self.repository.list_completed().await?;
        Ok(active
            .into_iter()
            .chain(completed)
            .filter(|task| task.module_group_id() == Some(group))
            .collect())
    }

    /// Returns active tasks waiting for merge.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn list_ready_to_merge(&self) -> TaskRegistryResult<Vec<Task>> {
        let active = self.repository.list_active().await?;
        Ok(active
            .into_iter()
            .filter(|task| task.status() == TaskStatus::ReadyToMerge)
            .collect())
    }

    /// Returns active tasks for one book module.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn list_module_tasks(&self, key: &ModuleKey) -> TaskRegistryResult<Vec<Task>> {
        let active = self.repository.list_active().await?;
        Ok(active
            .into_iter()
            .filter(|task| task.book() == key.book() && task.module() == key.module())
            .collect())
    }

    /// Returns whether exactly one glossary and one tests task exist for the
    /// module and both are ready to merge.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn is_module_ready(&self, key: &ModuleKey) -> TaskRegistryResult<bool> {
        let tasks = self.list_module_tasks(key).await?;
        Ok(module_ready(&tasks))
    }

    /// Group-based variant of [`Self::is_module_ready`], over active tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn is_group_ready(&self, group: ModuleGroupId) -> TaskRegistryResult<bool> {
        let active = self.repository.list_active().await?;
        let tasks: Vec<Task> = active
            .into_iter()
            .filter(|task| task.module_group_id() == Some(group))
            .collect();
        Ok(module_ready(&tasks))
    }

    async fn find_active(&self, id: TaskId) -> TaskRegistryResult<Option<Task>> {
        let task = self.repository.find_by_id(id).await?;
        Ok(task.filter(|found| found.status().is_active()))
    }
}
