//! Domain model for the procurement lifecycle core.
//!
//! Pure business logic with no infrastructure dependencies: the status
//! graphs and state machine, transition authorization, timeline
//! reconstruction, and metric aggregation. All state is threaded through
//! explicit arguments; nothing here performs I/O or reads an ambient
//! clock.

mod actor;
mod error;
mod graph;
mod guard;
mod ids;
mod item;
mod machine;
mod metrics;
mod timeline;

pub use actor::{ActorContext, ActorRefs, EntityType, Role};
pub use error::{
    GraphConfigError, ParseEdgeKindError, ParseEntityTypeError, ParseRoleError, ParseRuleError,
    ParseStatusError, TimelineError, UnauthorizedCause, WorkflowDomainError,
};
pub use graph::{
    EdgeKind, StatusGraph, StatusGraphBuilder, TransitionEdge, TransitionRule, WorkflowGraphs,
};
pub use guard::{AvailableAction, TransitionGuard};
pub use ids::{ActorId, Amount, ItemId, Revision, StatusName};
pub use item::{NewWorkflowItem, PersistedWorkflowItemData, WorkflowItem};
pub use machine::StateMachine;
pub use metrics::{MetricsAggregator, WorkflowMetrics};
pub use timeline::{StepDescriptions, StepSchedule, TimelineReconstructor, TimelineStep};
