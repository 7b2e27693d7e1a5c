//! Shared world state for workflow transition BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use palladio::workflow::{
    adapters::memory::InMemoryWorkflowItemStore,
    domain::{ActorId, WorkflowItem},
    services::{ActionDispatchError, ActionDispatchService},
};
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestWorkflowService = ActionDispatchService<InMemoryWorkflowItemStore, DefaultClock>;

/// Scenario world for workflow transition behaviour tests.
pub struct WorkflowTransitionWorld {
    pub service: TestWorkflowService,
    pub submitter: ActorId,
    pub item: Option<WorkflowItem>,
    pub replay_snapshot: Option<WorkflowItem>,
    pub last_transition_result: Option<Result<WorkflowItem, ActionDispatchError>>,
}

impl WorkflowTransitionWorld {
    /// Creates a world with empty pending scenario state.
    #[must_use]
    pub fn new() -> Self {
        let service = ActionDispatchService::builtin(
            Arc::new(InMemoryWorkflowItemStore::new()),
            Arc::new(DefaultClock),
        )
        .expect("builtin configuration should validate");

        Self {
            service,
            submitter: ActorId::new(),
            item: None,
            replay_snapshot: None,
            last_transition_result: None,
        }
    }
}

impl Default for WorkflowTransitionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> WorkflowTransitionWorld {
    WorkflowTransitionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
