//! Persisted registry document shared by the task adapters.

use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskRepositoryError, TaskRepositoryResult},
};
use serde::{Deserialize, Serialize};

/// The whole registry as one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDocument {
    /// Tasks not yet completed, in creation order.
    #[serde(default)]
    pub active_tasks: Vec<Task>,
    /// Completed tasks, in completion order.
    #[serde(default)]
    pub completed_tasks: Vec<Task>,
}

impl TaskDocument {
    /// Parses a stored document and repairs legacy status values.
    ///
    /// # Errors
    ///
    /// Returns the parser error for malformed input.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let mut document: Self = serde_json::from_str(raw)?;
        document
            .active_tasks
            .iter_mut()
            .for_each(Task::normalise_loaded);
        Ok(document)
    }

    /// Renders the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the serialiser error.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn active_position(&self, id: TaskId) -> Option<usize> {
        self.active_tasks.iter().position(|task| task.id() == id)
    }

    pub(crate) fn insert(&mut self, task: &Task) -> TaskRepositoryResult<()> {
        if self.find(task.id()).is_some() {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        self.active_tasks.push(task.clone());
        Ok(())
    }

    pub(crate) fn update(&mut self, task: &Task) -> TaskRepositoryResult<()> {
        let index = self
            .active_position(task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        if let Some(slot) = self.active_tasks.get_mut(index) {
            *slot = task.clone();
        }
        Ok(())
    }

    pub(crate) fn find(&self, id: TaskId) -> Option<&Task> {
        self.active_tasks
            .iter()
            .chain(self.completed_tasks.iter())
            .find(|task| task.id() == id)
    }

    pub(crate) fn archive(&mut self, task: &Task) -> TaskRepositoryResult<()> {
        let index = self
            .active_position(task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        self.active_tasks.remove(index);
        self.completed_tasks.push(task.clone());
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: TaskId) -> bool {
        let before = self.active_tasks.len();
        self.active_tasks.retain(|task| task.id() != id);
        self.active_tasks.len() != before
    }

    pub(crate) fn clear(&mut self) -> usize {
        let dropped = self.active_tasks.len() + self.completed_tasks.len();
        self.active_tasks.clear();
        self.completed_tasks.clear();
        dropped
    }
}
