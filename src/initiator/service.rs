//! Task initiator facade.

use super::{InitiatorError, InitiatorResult, PromptRenderer};
use crate::catalog::Catalog;
use crate::task::{
    domain::{ModuleKey, Task, TaskKind, TaskStatus, module_ready},
    ports::TaskRepository,
    services::{ModulePair, TaskRegistry},
};
use crate::vcs::{
    domain::{BranchName, MergeOutcome, MergeRequest},
    ports::{MergeWorkspace, RemoteRepository},
    services::MergeCoordinator,
};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// A created task with the prompt for its generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTask {
    /// The stored task.
    pub task: Task,
    /// Prompt to hand to the generator.
    pub prompt: String,
}

/// A created module pair with both prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPair {
    /// Identifiers of the pair.
    pub pair: ModulePair,
    /// Glossary prompt.
    pub glossary_prompt: String,
    /// Tests prompt.
    pub tests_prompt: String,
}

/// Result of a successful module merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// The merged module.
    pub module: ModuleKey,
    /// Human-readable step log.
    pub steps: Vec<String>,
}

/// Result of [`TaskInitiator::clear_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearReport {
    /// Tasks dropped from the registry.
    pub tasks_removed: usize,
    /// Remote branches deleted.
    pub deleted: Vec<BranchName>,
    /// Branches that could not be deleted, or a listing failure.
    pub errors: Vec<String>,
}

/// Operator summary of the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Active tasks without a branch.
    pub unlinked: usize,
    /// Active tasks with a branch still in progress.
    pub linked: usize,
    /// Active tasks waiting for merge.
    pub ready_to_merge: usize,
    /// Tasks completed on the current UTC date.
    pub completed_today: usize,
}

impl StatusReport {
    /// Returns the number of active tasks.
    #[must_use]
    pub const fn active(&self) -> usize {
        self.unlinked + self.linked + self.ready_to_merge
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "active: {} (unlinked {}, in progress {}, ready to merge {})",
            self.active(),
            self.unlinked,
            self.linked,
            self.ready_to_merge
        )?;
        write!(f, "completed today: {}", self.completed_today)
    }
}

/// Entry point for front ends.
pub struct TaskInitiator<T, R, W, C>
where
    T: TaskRepository,
    R: RemoteRepository,
    W: MergeWorkspace,
    C: Clock + Send + Sync,
{
    registry: Arc<TaskRegistry<T, C>>,
    remote: Arc<R>,
    coordinator: MergeCoordinator<W>,
    catalog: Arc<Catalog>,
    prompts: PromptRenderer,
    branch_prefix: String,
}

impl<T, R, W, C> TaskInitiator<T, R, W, C>
where
    T: TaskRepository,
    R: RemoteRepository,
    W: MergeWorkspace,
    C: Clock + Send + Sync,
{
    /// Creates an initiator.
    #[must_use]
    pub fn new(
        registry: Arc<TaskRegistry<T, C>>,
        remote: Arc<R>,
        coordinator: MergeCoordinator<W>,
        catalog: Arc<Catalog>,
        branch_prefix: impl Into<String>,
    ) -> Self {
        let prefix = branch_prefix.into();
        Self {
            registry,
            remote,
            coordinator,
            catalog,
            prompts: PromptRenderer::new(prefix.clone()),
            branch_prefix: prefix,
        }
    }

    /// Returns the registry this initiator writes to.
    #[must_use]
    pub const fn registry(&self) -> &Arc<TaskRegistry<T, C>> {
        &self.registry
    }

    /// Returns the book catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Creates one task for a catalog module and renders its prompt.
    ///
    /// `book` may be a catalog code or display name; the task stores the
    /// display name.
    ///
    /// # Errors
    ///
    /// Returns [`InitiatorError::Catalog`] for unknown books or modules out
    /// of range, and [`InitiatorError::Registry`] when storing fails.
    pub async fn create_task(
        &self,
        kind: TaskKind,
        book: &str,
        module: u32,
    ) -> InitiatorResult<CreatedTask> {
        let entry = self.catalog.resolve_module(book, module)?;
        let prompt = self.prompts.render(kind, &entry.name, module)?;
        let task = self
            .registry
            .create_task(kind, &entry.name, module, None)
            .await?;
        Ok(CreatedTask { task, prompt })
    }

    /// Creates the glossary and tests tasks of a module together.
    ///
    /// # Errors
    ///
    /// See [`Self::create_task`].
    pub async fn create_module_pair(&self, book: &str, module: u32) -> InitiatorResult<CreatedPair> {
        let entry = self.catalog.resolve_module(book, module)?;
        let glossary_prompt = self.prompts.render(TaskKind::Glossary, &entry.name, module)?;
        let tests_prompt = self.prompts.render(TaskKind::Tests, &entry.name, module)?;
        let pair = self.registry.create_module_pair(&entry.name, module).await?;
        Ok(CreatedPair {
            pair,
            glossary_prompt,
            tests_prompt,
        })
    }

    /// Lists active tasks.
    ///
    /// # Errors
    ///
    /// Returns [`InitiatorError::Registry`] when the registry fails.
    pub async fn list_active(&self) -> InitiatorResult<Vec<Task>> {
        Ok(self.registry.list_active().await?)
    }

    /// Lists tasks waiting for merge.
    ///
    /// # Errors
    ///
    /// Returns [`InitiatorError::Registry`] when the registry fails.
    pub async fn list_ready_to_merge(&self) -> InitiatorResult<Vec<Task>> {
        Ok(self.registry.list_ready_to_merge().await?)
    }

    /// Merges a ready module and completes both of its tasks.
    ///
    /// Both tasks stay ready to merge when the procedure fails, so the
    /// request can be repeated after manual remediation.
    ///
    /// # Errors
    ///
    /// Returns [`InitiatorError::ModuleNotReady`] unless exactly one glossary
    /// and one tests task are ready, [`InitiatorError::Catalog`] when the
    /// book has no folder, and [`InitiatorError::Merge`] naming the failed
    /// step.
    #[instrument(skip(self, module), fields(module = %module))]
    pub async fn request_merge(&self, module: &ModuleKey) -> InitiatorResult<MergeReport> {
        let tasks = self.registry.list_module_tasks(module).await?;
        if !module_ready(&tasks) {
            return Err(InitiatorError::ModuleNotReady {
                module: module.clone(),
            });
        }
        let glossary = task_of_kind(&tasks, TaskKind::Glossary, module)?;
        let tests = task_of_kind(&tasks, TaskKind::Tests, module)?;
        let book = self.catalog.resolve(module.book())?;

        let request = MergeRequest::new(
            linked_branch(glossary)?,
            linked_branch(tests)?,
            book.folder.clone(),
        );
        match self.coordinator.merge_module(&request).await {
            MergeOutcome::Merged { mut steps } => {
                for task in [glossary, tests] {
                    if !self.registry.complete(task.id()).await? {
                        warn!(task_id = %task.id(), %module, "merged task was no longer active");
                        steps.push(format!("Task {} was no longer active", task.id()));
                    }
                }
                info!(%module, "module merged");
                Ok(MergeReport {
                    module: module.clone(),
                    steps,
                })
            }
            MergeOutcome::Failed {
                step,
                message,
                steps,
            } => Err(InitiatorError::Merge {
                module: module.clone(),
                step,
                message,
                steps,
            }),
        }
    }

    /// Drops every task and deletes every remote branch under the prefix.
    ///
    /// Branch deletion failures are collected rather than aborting.
    ///
    /// # Errors
    ///
    /// Returns [`InitiatorError::Registry`] when clearing the registry fails.
    pub async fn clear_all(&self) -> InitiatorResult<ClearReport> {
        let mut report = ClearReport {
            tasks_removed: self.registry.clear_all().await?,
            ..ClearReport::default()
        };

        let branches = match self.remote.list_branches(&self.branch_prefix).await {
            Ok(branches) => branches,
            Err(err) => {
                warn!(%err, "failed to list branches for cleanup");
                report.errors.push(format!("list branches: {err}"));
                return Ok(report);
            }
        };

        for branch in branches {
            match self.remote.delete_branch(&branch).await {
                Ok(()) => report.deleted.push(branch),
                Err(err) => {
                    warn!(%branch, %err, "failed to delete branch");
                    report.errors.push(format!("{branch}: {err}"));
                }
            }
        }
        info!(
            tasks = report.tasks_removed,
            deleted = report.deleted.len(),
            errors = report.errors.len(),
            "cleared tasks and branches"
        );
        Ok(report)
    }

    /// Summarises active, ready and completed-today counts.
    ///
    /// # Errors
    ///
    /// Returns [`InitiatorError::Registry`] when the registry fails.
    pub async fn status_report(&self) -> InitiatorResult<StatusReport> {
        let today = self.registry.clock().utc().date_naive();
        let active = self.registry.list_active().await?;
        let completed = self.registry.list_completed_on(today).await?;

        let count = |status: TaskStatus| active.iter().filter(|task| task.status() == status).count();
        Ok(StatusReport {
            unlinked: count(TaskStatus::Unlinked),
            linked: count(TaskStatus::Linked),
            ready_to_merge: count(TaskStatus::ReadyToMerge),
            completed_today: completed.len(),
        })
    }

    /// Renders the prompt for an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`InitiatorError::TemplateRender`] when rendering fails.
    pub fn prompt_for(&self, task: &Task) -> InitiatorResult<String> {
        self.prompts.render(task.kind(), task.book(), task.module())
    }
}

fn task_of_kind<'a>(tasks: &'a [Task], kind: TaskKind, module: &ModuleKey) -> InitiatorResult<&'a Task> {
    tasks
        .iter()
        .find(|task| task.kind() == kind)
        .ok_or_else(|| InitiatorError::ModuleNotReady {
            module: module.clone(),
        })
}

fn linked_branch(task: &Task) -> InitiatorResult<BranchName> {
    task.branch()
        .cloned()
        .ok_or(InitiatorError::MissingBranch { task_id: task.id() })
}
