//! Task aggregate root.

use super::{ModuleGroupId, ModuleKey, TaskDomainError, TaskId, TaskKind, TaskStatus};
use crate::vcs::domain::BranchName;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Named milestone recorded on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint label, e.g. `checkpoint 2`.
    pub name: String,
    /// When the checkpoint was recorded.
    #[serde(alias = "time", with = "super::timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Outcome of offering a branch to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The branch was stored and the task moved to `linked`.
    Linked,
    /// The same branch was already stored; nothing changed.
    AlreadyLinked,
}

/// Task aggregate root.
///
/// The branch is write-once: after it is set, offering a different branch
/// fails and the stored value is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(alias = "task_id")]
    id: TaskId,
    #[serde(alias = "type")]
    kind: TaskKind,
    book: String,
    module: u32,
    #[serde(default, alias = "module_id")]
    module_group_id: Option<ModuleGroupId>,
    #[serde(default)]
    branch: Option<BranchName>,
    #[serde(default, with = "super::timestamp::option")]
    branch_linked_at: Option<DateTime<Utc>>,
    status: TaskStatus,
    #[serde(default)]
    checkpoints: Vec<Checkpoint>,
    #[serde(with = "super::timestamp")]
    started_at: DateTime<Utc>,
    #[serde(default, with = "super::timestamp::option")]
    completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates an unlinked task for one module deliverable.
    #[must_use]
    pub fn new(
        kind: TaskKind,
        key: &ModuleKey,
        module_group_id: Option<ModuleGroupId>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: TaskId::new(),
            kind,
            book: key.book().to_owned(),
            module: key.module(),
            module_group_id,
            branch: None,
            branch_linked_at: None,
            status: TaskStatus::Unlinked,
            checkpoints: Vec::new(),
            started_at: clock.utc(),
            completed_at: None,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the deliverable kind.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
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

    /// Returns the module coordinates.
    #[must_use]
    pub fn module_key(&self) -> ModuleKey {
        ModuleKey::from_task_parts(&self.book, self.module)
    }

    /// Returns the module group identifier, if the task was created as part
    /// of a pair.
    #[must_use]
    pub const fn module_group_id(&self) -> Option<ModuleGroupId> {
        self.module_group_id
    }

    /// Returns the linked branch, if any.
    #[must_use]
    pub const fn branch(&self) -> Option<&BranchName> {
        self.branch.as_ref()
    }

    /// Returns when the branch was linked.
    #[must_use]
    pub const fn branch_linked_at(&self) -> Option<DateTime<Utc>> {
        self.branch_linked_at
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns recorded checkpoints in append order.
    #[must_use]
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// Returns whether a checkpoint with this name was recorded.
    #[must_use]
    pub fn has_checkpoint(&self, name: &str) -> bool {
        self.checkpoints.iter().any(|checkpoint| checkpoint.name == name)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the completion timestamp, set on `ready_to_merge` or
    /// `completed`.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Links a branch to the task.
    ///
    /// Offering the branch that is already stored is a no-op. An unlinked
    /// task moves to [`TaskStatus::Linked`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::BranchAlreadyLinked`] when a different
    /// branch is already stored.
    pub fn link_branch(
        &mut self,
        branch: BranchName,
        clock: &impl Clock,
    ) -> Result<LinkOutcome, TaskDomainError> {
        if let Some(existing) = &self.branch {
            if *existing == branch {
                return Ok(LinkOutcome::AlreadyLinked);
            }
            return Err(TaskDomainError::BranchAlreadyLinked {
                task_id: self.id,
                existing: existing.clone(),
                offered: branch,
            });
        }

        self.branch = Some(branch);
        self.branch_linked_at = Some(clock.utc());
        if self.status == TaskStatus::Unlinked {
            self.status = TaskStatus::Linked;
        }
        Ok(LinkOutcome::Linked)
    }

    /// Appends a checkpoint to the history.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyCheckpointName`] for a blank name.
    pub fn append_checkpoint(
        &mut self,
        name: &str,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyCheckpointName);
        }
        self.checkpoints.push(Checkpoint {
            name: trimmed.to_owned(),
            timestamp: clock.utc(),
        });
        Ok(())
    }

    /// Moves the task to `target`.
    ///
    /// Entering `ready_to_merge` or `completed` stamps `completed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] when the state
    /// machine forbids the move, or [`TaskDomainError::BranchRequired`] when
    /// the target needs a branch and none is linked.
    pub fn transition_to(
        &mut self,
        target: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidStateTransition {
                task_id: self.id,
                from: self.status.as_str().to_owned(),
                to: target.as_str().to_owned(),
            });
        }
        if target.requires_branch() && self.branch.is_none() {
            return Err(TaskDomainError::BranchRequired {
                task_id: self.id,
                status: target.as_str().to_owned(),
            });
        }

        self.status = target;
        if matches!(target, TaskStatus::ReadyToMerge | TaskStatus::Completed) {
            self.completed_at = Some(clock.utc());
        }
        Ok(())
    }

    /// Repairs status values written by older tools, which kept a single
    /// in-progress status for linked and unlinked tasks alike.
    pub(crate) fn normalise_loaded(&mut self) {
        if self.status == TaskStatus::Unlinked && self.branch.is_some() {
            self.status = TaskStatus::Linked;
        }
    }
}
