//! Lifecycle events emitted by the reconciliation loop.

use crate::task::domain::{ModuleKey, Task, TaskId, TaskKind};
use crate::vcs::domain::BranchName;
use serde::{Deserialize, Serialize};

/// Identifying fields of a linked task carried by task-level events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    /// Task identifier.
    pub task_id: TaskId,
    /// Glossary or tests.
    pub kind: TaskKind,
    /// Book module the task belongs to.
    pub module: ModuleKey,
    /// Branch linked to the task.
    pub branch: BranchName,
}

impl TaskRef {
    /// Builds a reference from a task and the branch it is linked to.
    #[must_use]
    pub fn new(task: &Task, branch: BranchName) -> Self {
        Self {
            task_id: task.id(),
            kind: task.kind(),
            module: task.module_key(),
            branch,
        }
    }
}

/// Event pushed to the notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// A task was linked to a remote branch.
    BranchLinked(TaskRef),

    /// A content-bearing branch appeared on the remote.
    NewBranchDetected {
        /// The new branch.
        branch: BranchName,
    },

    /// A task's branch announced a checkpoint.
    Checkpoint {
        /// The task.
        task: TaskRef,
        /// Checkpoint label, e.g. `checkpoint 1`.
        name: String,
    },

    /// A task's branch announced completion; the task is ready to merge.
    TaskCompleted(TaskRef),

    /// Both tasks of a module are ready to merge.
    ModuleReady {
        /// The module.
        module: ModuleKey,
        /// Glossary task.
        glossary: TaskId,
        /// Tests task.
        tests: TaskId,
    },

    /// A linked task's branch has had no commits for too long.
    InactiveWarning {
        /// The task.
        task: TaskRef,
        /// Minutes since the branch head was committed.
        minutes_since_commit: i64,
    },
}

impl MonitorEvent {
    /// Returns the event name used in logs and serialised form.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BranchLinked(_) => "branch_linked",
            Self::NewBranchDetected { .. } => "new_branch_detected",
            Self::Checkpoint { .. } => "checkpoint",
            Self::TaskCompleted(_) => "task_completed",
            Self::ModuleReady { .. } => "module_ready",
            Self::InactiveWarning { .. } => "inactive_warning",
        }
    }

    /// Returns the key under which repeats of this event are suppressed.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        match self {
            Self::BranchLinked(task) => format!("{}:linked", task.task_id),
            Self::NewBranchDetected { branch } => format!("branch:{branch}"),
            Self::Checkpoint { task, name } => format!("{}:checkpoint:{name}", task.task_id),
            Self::TaskCompleted(task) => format!("{}:completed", task.task_id),
            Self::ModuleReady {
                glossary, tests, ..
            } => format!("{glossary}:{tests}:module_ready"),
            Self::InactiveWarning { task, .. } => format!("{}:inactive", task.task_id),
        }
    }

    /// Renders a one-line, operator-facing summary.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::BranchLinked(task) => {
                format!("{} {} linked to {}", task.module, task.kind, task.branch)
            }
            Self::NewBranchDetected { branch } => format!("new branch {branch}"),
            Self::Checkpoint { task, name } => {
                format!("{} {} reached {name}", task.module, task.kind)
            }
            Self::TaskCompleted(task) => {
                format!("{} {} complete, ready to merge", task.module, task.kind)
            }
            Self::ModuleReady { module, .. } => {
                format!("{module} ready: glossary and tests can be merged")
            }
            Self::InactiveWarning {
                task,
                minutes_since_commit,
            } => format!(
                "{} {} has had no commits for {minutes_since_commit} minutes",
                task.module, task.kind
            ),
        }
    }
}
