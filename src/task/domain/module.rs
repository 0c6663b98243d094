//! Catalog coordinates shared by the two tasks of a module.

use super::{Task, TaskDomainError, TaskKind, TaskStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Book and module number identifying one module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleKey {
    book: String,
    module: u32,
}

impl ModuleKey {
    /// Creates a validated module key.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyBook`] for a blank book and
    /// [`TaskDomainError::InvalidModuleNumber`] for module zero.
    pub fn new(book: impl Into<String>, module: u32) -> Result<Self, TaskDomainError> {
        let raw = book.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyBook);
        }
        if module == 0 {
            return Err(TaskDomainError::InvalidModuleNumber(module));
        }
        Ok(Self {
            book: trimmed.to_owned(),
            module,
        })
    }

    /// Rebuilds a key from coordinates already stored on a task.
    pub(crate) fn from_task_parts(book: &str, module: u32) -> Self {
        Self {
            book: book.to_owned(),
            module,
        }
    }

    /// Returns the book name.
    #[must_use]
    pub fn book(&self) -> &str {
        &self.book
    }

    /// Returns the module number.
    #[must_use]
    pub const fn module(&self) -> u32 {
        self.module
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} module {}", self.book, self.module)
    }
}

/// Returns whether a module's tasks are ready to merge.
///
/// True only for exactly one glossary and one tests task, both in
/// `ready_to_merge`. Fewer tasks, duplicates or a second task of the same
/// kind all make the module not ready.
#[must_use]
pub fn module_ready(tasks: &[Task]) -> bool {
    let [first, second] = tasks else {
        return false;
    };
    let mut kinds = [first.kind(), second.kind()];
    kinds.sort();
    kinds == TaskKind::ALL
        && tasks
            .iter()
            .all(|task| task.status() == TaskStatus::ReadyToMerge)
}
