//! Shared world state for stall detection BDD scenarios.

use std::sync::Arc;

use branchwarden::monitor::{
    adapters::RecordingSink,
    services::{MonitorSettings, ReconciliationLoop},
};
use branchwarden::task::{adapters::memory::InMemoryTaskRepository, services::TaskRegistry};
use branchwarden::test_support::FixedClock;
use branchwarden::vcs::{
    adapters::memory::InMemoryRemoteRepository,
    domain::{BranchName, CommitInfo},
    services::BranchOracle,
};
use rstest::fixture;

/// Loop type used by the BDD world.
pub type TestLoop = ReconciliationLoop<
    InMemoryTaskRepository,
    InMemoryRemoteRepository,
    FixedClock,
    RecordingSink,
>;

/// Scenario world for stall detection behaviour tests.
pub struct StallWorld {
    pub registry: Arc<TaskRegistry<InMemoryTaskRepository, FixedClock>>,
    pub remote: InMemoryRemoteRepository,
    pub clock: FixedClock,
    pub sink: RecordingSink,
    pub monitor: TestLoop,
    pub branch: Option<BranchName>,
    pub commits: u32,
}

impl StallWorld {
    /// Creates a world with default loop settings and no tasks.
    #[must_use]
    pub fn new() -> Self {
        let clock = FixedClock::at_epoch();
        let remote = InMemoryRemoteRepository::new();
        let sink = RecordingSink::new();
        let registry = Arc::new(TaskRegistry::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(clock.clone()),
        ));
        let monitor = ReconciliationLoop::new(
            Arc::clone(&registry),
            BranchOracle::new(Arc::new(remote.clone()), Arc::new(clock.clone())),
            Arc::new(sink.clone()),
            MonitorSettings::default(),
        );
        Self {
            registry,
            remote,
            clock,
            sink,
            monitor,
            branch: None,
            commits: 0,
        }
    }

    /// Pushes a commit stamped with the current clock time.
    pub fn push_commit(&mut self, branch: &BranchName) -> Result<(), eyre::Report> {
        self.commits += 1;
        let commit = CommitInfo::new(
            format!("c{}", self.commits),
            format!("Add batch {}", self.commits),
            self.clock.minutes_ago(0),
        );
        self.remote
            .push_commit(branch, commit)
            .map_err(|err| eyre::eyre!("push commit: {err}"))
    }
}

impl Default for StallWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> StallWorld {
    StallWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
