//! Shared wiring for in-memory end-to-end tests.

use std::sync::Arc;

use branchwarden::catalog::Catalog;
use branchwarden::initiator::TaskInitiator;
use branchwarden::monitor::{
    adapters::RecordingSink,
    domain::MonitorEvent,
    ports::NotificationSink,
    services::{CycleReport, MonitorSettings, ReconciliationLoop},
};
use branchwarden::task::{adapters::memory::InMemoryTaskRepository, services::TaskRegistry};
use branchwarden::test_support::FixedClock;
use branchwarden::vcs::{
    adapters::memory::{InMemoryMergeWorkspace, InMemoryRemoteRepository},
    domain::{BranchName, CommitInfo},
    services::{BranchOracle, MergeCoordinator},
};
use rstest::fixture;

/// Registry type shared by the loop and the initiator.
pub type Registry = TaskRegistry<InMemoryTaskRepository, FixedClock>;

/// Fully wired system over in-memory adapters.
pub struct Stack<S: NotificationSink> {
    pub registry: Arc<Registry>,
    pub remote: InMemoryRemoteRepository,
    pub workspace: InMemoryMergeWorkspace,
    pub clock: FixedClock,
    pub initiator: TaskInitiator<
        InMemoryTaskRepository,
        InMemoryRemoteRepository,
        InMemoryMergeWorkspace,
        FixedClock,
    >,
    pub monitor: ReconciliationLoop<InMemoryTaskRepository, InMemoryRemoteRepository, FixedClock, S>,
}

impl<S: NotificationSink> Stack<S> {
    /// Wires every component around `sink`.
    #[must_use]
    pub fn with_sink(sink: Arc<S>) -> Self {
        let clock = FixedClock::at_epoch();
        let remote = InMemoryRemoteRepository::new();
        let workspace = InMemoryMergeWorkspace::new();
        let registry = Arc::new(TaskRegistry::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(clock.clone()),
        ));
        let initiator = TaskInitiator::new(
            Arc::clone(&registry),
            Arc::new(remote.clone()),
            MergeCoordinator::new(Arc::new(workspace.clone()), "main"),
            Arc::new(Catalog::builtin()),
            "claude/",
        );
        let monitor = ReconciliationLoop::new(
            Arc::clone(&registry),
            BranchOracle::new(Arc::new(remote.clone()), Arc::new(clock.clone())),
            sink,
            MonitorSettings::default(),
        );
        Self {
            registry,
            remote,
            workspace,
            clock,
            initiator,
            monitor,
        }
    }

    /// Pushes a commit stamped `minutes_ago` before the clock.
    pub fn commit(&self, branch: &str, sha: &str, message: &str, minutes_ago: i64) {
        let name = BranchName::new(branch).expect("valid branch name");
        self.remote
            .push_commit(
                &name,
                CommitInfo::new(sha, message, self.clock.minutes_ago(minutes_ago)),
            )
            .expect("push succeeds");
    }

    /// Runs one reconciliation cycle.
    pub async fn cycle(&mut self) -> CycleReport {
        self.monitor.run_cycle().await.expect("cycle succeeds")
    }
}

/// Stack that records every event.
pub struct RecordedStack {
    pub stack: Stack<RecordingSink>,
    pub sink: RecordingSink,
}

impl RecordedStack {
    /// Returns and clears the recorded events.
    pub fn drain(&self) -> Vec<MonitorEvent> {
        self.sink.drain().expect("events readable")
    }
}

/// Provides a stack with a recording sink.
#[fixture]
pub fn recorded() -> RecordedStack {
    let sink = RecordingSink::new();
    RecordedStack {
        stack: Stack::with_sink(Arc::new(sink.clone())),
        sink,
    }
}

/// Returns the event names, in order.
#[must_use]
pub fn names(events: &[MonitorEvent]) -> Vec<&'static str> {
    events.iter().map(MonitorEvent::name).collect()
}
