//! Shared world state for module readiness BDD scenarios.

use std::sync::Arc;

use branchwarden::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{TaskId, TaskKind},
    services::TaskRegistry,
};
use branchwarden::test_support::FixedClock;
use rstest::fixture;

/// Registry type used by the BDD world.
pub type TestRegistry = TaskRegistry<InMemoryTaskRepository, FixedClock>;

/// Scenario world for module readiness behaviour tests.
pub struct ReadinessWorld {
    pub registry: TestRegistry,
    pub tasks: Vec<(TaskId, TaskKind)>,
}

impl ReadinessWorld {
    /// Creates a world over an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: TaskRegistry::new(
                Arc::new(InMemoryTaskRepository::new()),
                Arc::new(FixedClock::at_epoch()),
            ),
            tasks: Vec::new(),
        }
    }
}

impl Default for ReadinessWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ReadinessWorld {
    ReadinessWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
