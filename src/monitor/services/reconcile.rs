//! The reconciliation loop.
//!
//! Each cycle takes one snapshot of the remote branch set and walks the
//! active tasks against it:
//!
//! - unlinked tasks are matched to an unclaimed branch and linked;
//! - linked tasks whose branch vanished upstream are removed; tasks ready
//!   to merge are left alone, since the merge itself deletes their branches;
//! - linked tasks get new checkpoints appended, are marked ready when the
//!   branch head announces completion, and raise a one-shot warning when
//!   the branch goes quiet.
//!
//! Notifications are deduplicated for the lifetime of the loop instance.

use super::MonitorSettings;
use crate::monitor::{
    domain::{MonitorEvent, TaskRef},
    ports::NotificationSink,
};
use crate::task::{
    domain::{Task, TaskId, TaskKind, TaskStatus, module_ready},
    ports::TaskRepository,
    services::{TaskRegistry, TaskRegistryError},
};
use crate::vcs::{
    domain::{BranchName, match_branch},
    ports::RemoteRepository,
    services::{BranchOracle, LastCommit, checkpoints_in},
};
use mockable::Clock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Errors that abort a single cycle.
///
/// Remote failures never surface here; the oracle absorbs them.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The registry could not be read or written.
    #[error(transparent)]
    Registry(#[from] TaskRegistryError),
}

/// Counters describing one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Whether the remote branch list could be fetched.
    pub remote_reachable: bool,
    /// Branches under the configured prefix.
    pub branches_seen: usize,
    /// Active tasks examined.
    pub tasks_checked: usize,
    /// Tasks linked to a branch this cycle.
    pub linked: usize,
    /// Checkpoints appended this cycle.
    pub checkpoints: usize,
    /// Tasks marked ready to merge this cycle.
    pub completed: usize,
    /// Tasks removed because their branch disappeared.
    pub removed: usize,
    /// Notifications delivered.
    pub notifications: usize,
}

#[derive(Debug, Default)]
struct LoopState {
    cycles: u64,
    notified: HashSet<String>,
    known_branches: Option<HashSet<BranchName>>,
    last_head: HashMap<TaskId, String>,
}

/// Polling loop that reconciles the registry with the remote.
pub struct ReconciliationLoop<T, R, C, S>
where
    T: TaskRepository,
    R: RemoteRepository,
    C: Clock + Send + Sync,
    S: NotificationSink,
{
    registry: Arc<TaskRegistry<T, C>>,
    oracle: BranchOracle<R, C>,
    sink: Arc<S>,
    settings: MonitorSettings,
    state: LoopState,
}

impl<T, R, C, S> ReconciliationLoop<T, R, C, S>
where
    T: TaskRepository,
    R: RemoteRepository,
    C: Clock + Send + Sync,
    S: NotificationSink,
{
    /// Creates a loop with empty dedup state.
    #[must_use]
    pub fn new(
        registry: Arc<TaskRegistry<T, C>>,
        oracle: BranchOracle<R, C>,
        sink: Arc<S>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            registry,
            oracle,
            sink,
            settings,
            state: LoopState::default(),
        }
    }

    /// Returns the loop settings.
    #[must_use]
    pub const fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Runs one reconciliation cycle.
    ///
    /// When the remote branch list cannot be fetched the cycle does nothing
    /// and reports `remote_reachable: false`; tasks are never removed on the
    /// strength of a failed listing.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Registry`] when the registry fails.
    #[instrument(skip(self))]
    pub async fn run_cycle(&mut self) -> Result<CycleReport, MonitorError> {
        self.state.cycles = self.state.cycles.saturating_add(1);
        let mut report = CycleReport::default();

        let Some(branches) = self
            .oracle
            .snapshot_branches(&self.settings.branch_prefix)
            .await
        else {
            debug!(cycle = self.state.cycles, "remote unavailable, skipping cycle");
            return Ok(report);
        };
        report.remote_reachable = true;
        report.branches_seen = branches.len();

        self.detect_new_branches(&branches, &mut report).await;

        let active = self.registry.list_active().await?;
        let mut claimed: HashSet<BranchName> =
            active.iter().filter_map(|task| task.branch().cloned()).collect();

        for task in &active {
            report.tasks_checked += 1;
            match task.branch() {
                None => {
                    self.try_link(task, &branches, &mut claimed, &mut report)
                        .await?;
                }
                Some(branch) if task.status() != TaskStatus::Linked => {
                    debug!(task_id = %task.id(), %branch, "task waits for merge");
                }
                Some(branch) if !branches.contains(branch) => {
                    self.drop_orphaned(task, branch, &mut report).await?;
                }
                Some(branch) => {
                    self.advance_linked(task, branch, &mut report).await?;
                }
            }
        }

        debug!(cycle = self.state.cycles, ?report, "reconciliation cycle finished");
        Ok(report)
    }

    /// Runs cycles forever, sleeping between them.
    ///
    /// A failed cycle is logged and followed by the error backoff instead of
    /// the poll interval; the loop itself never exits.
    pub async fn run_forever(mut self) {
        info!(
            prefix = %self.settings.branch_prefix,
            interval_secs = self.settings.poll_interval.as_secs(),
            "reconciliation loop started"
        );
        loop {
            let pause = match self.run_cycle().await {
                Ok(_) => self.settings.poll_interval,
                Err(err) => {
                    error!(%err, "reconciliation cycle failed");
                    self.settings.error_backoff
                }
            };
            tokio::time::sleep(pause).await;
        }
    }

    /// Runs the loop on the tokio runtime as an independent task.
    pub fn spawn(self) -> JoinHandle<()>
    where
        T: 'static,
        R: 'static,
        C: 'static,
        S: 'static,
    {
        tokio::spawn(self.run_forever())
    }

    async fn detect_new_branches(&mut self, branches: &[BranchName], report: &mut CycleReport) {
        let current: HashSet<BranchName> = branches
            .iter()
            .filter(|branch| branch.is_content_branch())
            .cloned()
            .collect();
        let Some(previous) = self.state.known_branches.replace(current) else {
            debug!("seeded known branches");
            return;
        };

        for branch in branches {
            if branch.is_content_branch() && !previous.contains(branch) {
                let event = MonitorEvent::NewBranchDetected {
                    branch: branch.clone(),
                };
                self.emit(event, report).await;
            }
        }
    }

    async fn try_link(
        &mut self,
        task: &Task,
        branches: &[BranchName],
        claimed: &mut HashSet<BranchName>,
        report: &mut CycleReport,
    ) -> Result<(), MonitorError> {
        let unclaimed = branches.iter().filter(|branch| !claimed.contains(*branch));
        let Some(branch) = match_branch(task.kind(), task.book(), task.module(), unclaimed) else {
            return Ok(());
        };

        if !self.registry.link_branch(task.id(), branch.clone()).await? {
            return Ok(());
        }
        claimed.insert(branch.clone());
        report.linked += 1;
        self.emit(MonitorEvent::BranchLinked(TaskRef::new(task, branch)), report)
            .await;
        Ok(())
    }

    async fn drop_orphaned(
        &mut self,
        task: &Task,
        branch: &BranchName,
        report: &mut CycleReport,
    ) -> Result<(), MonitorError> {
        if self.registry.remove(task.id()).await? {
            warn!(task_id = %task.id(), %branch, "branch disappeared upstream, removed task");
            self.state.last_head.remove(&task.id());
            report.removed += 1;
        }
        Ok(())
    }

    async fn advance_linked(
        &mut self,
        task: &Task,
        branch: &BranchName,
        report: &mut CycleReport,
    ) -> Result<(), MonitorError> {
        let Some(last) = self.oracle.last_commit(branch).await else {
            return Ok(());
        };

        if self.state.last_head.get(&task.id()) != Some(&last.commit.sha) {
            self.record_checkpoints(task, branch, &last.commit.sha, report)
                .await?;
        }

        if last.commit.marks_completion() {
            debug!(task_id = %task.id(), %branch, sha = %last.commit.sha, "branch head marks completion");
            return self.complete(task, branch, report).await;
        }

        self.check_stall(task, branch, &last, report).await;
        Ok(())
    }

    async fn record_checkpoints(
        &mut self,
        task: &Task,
        branch: &BranchName,
        head_sha: &str,
        report: &mut CycleReport,
    ) -> Result<(), MonitorError> {
        let commits = self.oracle.list_commits(branch).await;
        if commits.is_empty() {
            return Ok(());
        }

        let mut appended = HashSet::new();
        for mark in checkpoints_in(&commits) {
            if task.has_checkpoint(&mark.name) || !appended.insert(mark.name.clone()) {
                continue;
            }
            if !self.registry.append_checkpoint(task.id(), &mark.name).await? {
                continue;
            }
            report.checkpoints += 1;
            let event = MonitorEvent::Checkpoint {
                task: TaskRef::new(task, branch.clone()),
                name: mark.name,
            };
            self.emit(event, report).await;
        }
        self.state.last_head.insert(task.id(), head_sha.to_owned());
        Ok(())
    }

    async fn complete(
        &mut self,
        task: &Task,
        branch: &BranchName,
        report: &mut CycleReport,
    ) -> Result<(), MonitorError> {
        if !self.registry.mark_ready(task.id()).await? {
            return Ok(());
        }
        report.completed += 1;
        self.state.last_head.remove(&task.id());
        self.emit(
            MonitorEvent::TaskCompleted(TaskRef::new(task, branch.clone())),
            report,
        )
        .await;

        let module = task.module_key();
        let siblings = self.registry.list_module_tasks(&module).await?;
        if !module_ready(&siblings) {
            return Ok(());
        }
        let id_of = |kind: TaskKind| {
            siblings
                .iter()
                .find(|sibling| sibling.kind() == kind)
                .map(Task::id)
        };
        if let (Some(glossary), Some(tests)) = (id_of(TaskKind::Glossary), id_of(TaskKind::Tests)) {
            info!(%module, "module ready to merge");
            let event = MonitorEvent::ModuleReady {
                module,
                glossary,
                tests,
            };
            self.emit(event, report).await;
        }
        Ok(())
    }

    async fn check_stall(
        &mut self,
        task: &Task,
        branch: &BranchName,
        last: &LastCommit,
        report: &mut CycleReport,
    ) {
        let Some(linked_at) = task.branch_linked_at() else {
            return;
        };
        let linked_for = (self.registry.clock().utc() - linked_at).num_minutes();
        if linked_for < self.settings.stall_grace_mins
            || last.minutes_ago <= self.settings.stall_threshold_mins
        {
            return;
        }

        let event = MonitorEvent::InactiveWarning {
            task: TaskRef::new(task, branch.clone()),
            minutes_since_commit: last.minutes_ago,
        };
        self.emit(event, report).await;
    }

    async fn emit(&mut self, event: MonitorEvent, report: &mut CycleReport) {
        let key = event.dedup_key();
        if !self.state.notified.insert(key.clone()) {
            debug!(%key, "notification already sent");
            return;
        }
        match self.sink.notify(&event).await {
            Ok(()) => report.notifications += 1,
            Err(err) => {
                warn!(event = event.name(), %err, "failed to deliver notification");
                self.state.notified.remove(&key);
            }
        }
    }
}
