//! State machine lookup facade over the validated workflow graphs.

use super::{
    EntityType, GraphConfigError, Role, StatusGraph, StatusName, WorkflowDomainError,
    WorkflowGraphs,
};

/// Pure lookup over the per-entity-type status graphs.
///
/// Holds no mutable state and performs no I/O; every answer is a function
/// of the graphs loaded at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMachine {
    graphs: WorkflowGraphs,
}

impl StateMachine {
    /// Creates a state machine over validated graphs.
    #[must_use]
    pub const fn new(graphs: WorkflowGraphs) -> Self {
        Self { graphs }
    }

    /// Creates a state machine over the builtin default graphs.
    ///
    /// # Errors
    ///
    /// Returns [`GraphConfigError`] if the builtin definitions fail
    /// validation.
    pub fn builtin() -> Result<Self, GraphConfigError> {
        Ok(Self::new(WorkflowGraphs::builtin()?))
    }

    /// Returns the graph for an entity type.
    #[must_use]
    pub const fn graph(&self, entity_type: EntityType) -> &StatusGraph {
        self.graphs.graph(entity_type)
    }

    /// Returns the initial status for an entity type.
    #[must_use]
    pub const fn initial_status(&self, entity_type: EntityType) -> &StatusName {
        self.graph(entity_type).initial()
    }

    /// Returns the legal transitions out of a status as
    /// `(target, required role)` pairs.
    ///
    /// Empty for terminal and unknown statuses.
    #[must_use]
    pub fn allowed_transitions(
        &self,
        entity_type: EntityType,
        status: &StatusName,
    ) -> Vec<(StatusName, Role)> {
        self.graph(entity_type)
            .outgoing(status)
            .map(|edge| (edge.to().clone(), edge.required_role()))
            .collect()
    }

    /// Returns whether the status is terminal for the entity type.
    #[must_use]
    pub fn is_terminal(&self, entity_type: EntityType, status: &StatusName) -> bool {
        self.graph(entity_type).is_terminal(status)
    }

    /// Returns whether the status is a terminal reached through a failure
    /// edge.
    #[must_use]
    pub fn is_terminal_failure(&self, entity_type: EntityType, status: &StatusName) -> bool {
        self.graph(entity_type).is_terminal_failure(status)
    }

    /// Checks that the status belongs to the entity type's graph.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::InvalidState`] for out-of-graph
    /// statuses.
    pub fn require_known(
        &self,
        entity_type: EntityType,
        status: &StatusName,
    ) -> Result<(), WorkflowDomainError> {
        self.graph(entity_type).require_known(status)
    }

    /// Returns the canonical path from the initial status to `status`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::InvalidState`] for out-of-graph
    /// statuses.
    pub fn canonical_path(
        &self,
        entity_type: EntityType,
        status: &StatusName,
    ) -> Result<Vec<StatusName>, WorkflowDomainError> {
        self.graph(entity_type).canonical_path(status)
    }

    /// Returns the full happy path for an entity type.
    #[must_use]
    pub fn happy_path(&self, entity_type: EntityType) -> &[StatusName] {
        self.graph(entity_type).happy_path()
    }

    /// Returns lifecycle progress as an integer percentage in `[0, 100]`:
    /// completed canonical steps over the happy-path length.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::InvalidState`] for out-of-graph
    /// statuses.
    pub fn completion_percent(
        &self,
        entity_type: EntityType,
        status: &StatusName,
    ) -> Result<u8, WorkflowDomainError> {
        let graph = self.graph(entity_type);
        let path = graph.canonical_path(status)?;
        let completed = if graph.is_terminal(status) {
            path.len()
        } else {
            path.len().saturating_sub(1)
        };
        Ok(percent_of(completed, graph.happy_path().len()))
    }
}

/// Integer percentage of `part` over `whole`, clamped to `[0, 100]`.
fn percent_of(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let scaled = u128::try_from(part).unwrap_or(0).saturating_mul(100);
    let percent = scaled
        .checked_div(u128::try_from(whole).unwrap_or(1))
        .unwrap_or(0);
    u8::try_from(percent.min(100)).unwrap_or(100)
}
