//! Error types for workflow domain validation, parsing, and authorization.

use super::{EntityType, Role, StatusName};
use thiserror::Error;

/// Reason an actor was refused a transition they requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnauthorizedCause {
    /// The actor's role does not match the role required by the edge.
    RoleMismatch {
        /// Role the transition edge requires.
        required: Role,
        /// Role the requesting actor holds.
        actual: Role,
    },
    /// The submitting actor attempted to approve or reject their own item.
    SelfApproval,
}

impl std::fmt::Display for UnauthorizedCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RoleMismatch { required, actual } => {
                write!(f, "requires role {required}, actor holds {actual}")
            }
            Self::SelfApproval => f.write_str("submitters may not decide their own items"),
        }
    }
}

/// Errors raised while evaluating or applying workflow transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowDomainError {
    /// The item's status is not part of its entity type's status graph.
    #[error("status '{status}' is not part of the {entity_type} workflow")]
    InvalidState {
        /// Entity type whose graph was consulted.
        entity_type: EntityType,
        /// The out-of-graph status found on the item.
        status: StatusName,
    },

    /// No edge exists from the item's current status to the requested one.
    #[error("{entity_type} has no transition from '{from}' to '{to}'")]
    IllegalTransition {
        /// Entity type whose graph was consulted.
        entity_type: EntityType,
        /// The item's current status.
        from: StatusName,
        /// The requested target status.
        to: StatusName,
    },

    /// The actor may not apply the requested transition.
    #[error("transition to '{to}' not authorised: {cause}")]
    Unauthorized {
        /// The requested target status.
        to: StatusName,
        /// Why authorization failed.
        cause: UnauthorizedCause,
    },

    /// An edge precondition rule evaluated to false.
    #[error("precondition '{rule}' failed for transition to '{to}'")]
    PreconditionFailed {
        /// Canonical name of the failing rule.
        rule: String,
        /// The requested target status.
        to: StatusName,
    },

    /// The item's current status is terminal; nothing may follow it.
    #[error("item is already finalized in terminal status '{status}'")]
    AlreadyFinalized {
        /// The terminal status the item holds.
        status: StatusName,
    },
}

/// Fatal status-graph configuration errors, detected at load time.
///
/// A process must refuse to start with a graph that fails these checks; no
/// variant here is recoverable at runtime.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphConfigError {
    /// The graph declares no initial status.
    #[error("{entity_type} graph declares no initial status")]
    MissingInitial {
        /// Entity type of the offending graph.
        entity_type: EntityType,
    },

    /// The graph declares no terminal status.
    #[error("{entity_type} graph declares no terminal status")]
    MissingTerminal {
        /// Entity type of the offending graph.
        entity_type: EntityType,
    },

    /// An edge references a status the graph does not declare.
    #[error("{entity_type} graph edge references undeclared status '{status}'")]
    UnknownStatus {
        /// Entity type of the offending graph.
        entity_type: EntityType,
        /// The undeclared status.
        status: StatusName,
    },

    /// A declared status cannot be reached from the initial status.
    #[error("{entity_type} status '{status}' is unreachable from the initial status")]
    UnreachableStatus {
        /// Entity type of the offending graph.
        entity_type: EntityType,
        /// The unreachable status.
        status: StatusName,
    },

    /// A terminal status has outgoing edges.
    #[error("{entity_type} terminal status '{status}' has outgoing edges")]
    TerminalWithOutgoing {
        /// Entity type of the offending graph.
        entity_type: EntityType,
        /// The offending terminal status.
        status: StatusName,
    },

    /// An edge targets the initial status.
    #[error("{entity_type} graph has an edge into the initial status '{status}'")]
    EdgeIntoInitial {
        /// Entity type of the offending graph.
        entity_type: EntityType,
        /// The initial status.
        status: StatusName,
    },

    /// The graph contains a cycle.
    #[error("{entity_type} graph contains a cycle")]
    CycleDetected {
        /// Entity type of the offending graph.
        entity_type: EntityType,
    },

    /// A non-initial status has no canonical inbound edge.
    #[error("{entity_type} status '{status}' has no canonical inbound edge")]
    MissingCanonicalInbound {
        /// Entity type of the offending graph.
        entity_type: EntityType,
        /// The status lacking a canonical inbound edge.
        status: StatusName,
    },

    /// A status has more than one canonical inbound edge.
    #[error("{entity_type} status '{status}' has more than one canonical inbound edge")]
    DuplicateCanonicalInbound {
        /// Entity type of the offending graph.
        entity_type: EntityType,
        /// The status with conflicting canonical inbound edges.
        status: StatusName,
    },

    /// A status has more than one canonical advance edge leaving it.
    #[error("{entity_type} status '{status}' has an ambiguous happy-path continuation")]
    AmbiguousHappyPath {
        /// Entity type of the offending graph.
        entity_type: EntityType,
        /// The status with multiple canonical advance edges.
        status: StatusName,
    },

    /// The happy path ends on a non-terminal status.
    #[error("{entity_type} happy path dead-ends at non-terminal status '{status}'")]
    HappyPathDeadEnd {
        /// Entity type of the offending graph.
        entity_type: EntityType,
        /// The non-terminal status the chain stops at.
        status: StatusName,
    },

    /// Two graphs were supplied for the same entity type.
    #[error("more than one graph supplied for entity type {entity_type}")]
    DuplicateGraph {
        /// Entity type declared twice.
        entity_type: EntityType,
    },

    /// No graph was supplied for an entity type.
    #[error("no graph supplied for entity type {entity_type}")]
    MissingGraph {
        /// Entity type lacking a graph.
        entity_type: EntityType,
    },

    /// A timeline description template failed to render during validation.
    #[error("description template for {entity_type} status '{status}' is invalid: {reason}")]
    InvalidTemplate {
        /// Entity type the template belongs to.
        entity_type: EntityType,
        /// Status the template describes.
        status: StatusName,
        /// Renderer failure message.
        reason: String,
    },
}

/// Errors raised while reconstructing a timeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimelineError {
    /// The item's status is outside its graph.
    #[error(transparent)]
    Domain(#[from] WorkflowDomainError),

    /// A step description template failed to render.
    #[error("description template for {entity_type} status '{status}' failed to render: {reason}")]
    Template {
        /// Entity type the template belongs to.
        entity_type: EntityType,
        /// Status the template describes.
        status: StatusName,
        /// Renderer failure message.
        reason: String,
    },
}

/// Error returned while parsing status names.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid status name '{0}', expected lowercase snake_case")]
pub struct ParseStatusError(pub String);

/// Error returned while parsing entity types from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown entity type: {0}")]
pub struct ParseEntityTypeError(pub String);

/// Error returned while parsing actor roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

/// Error returned while parsing transition precondition rules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown transition rule: {0}")]
pub struct ParseRuleError(pub String);

/// Error returned while parsing transition edge kinds.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown edge kind: {0}")]
pub struct ParseEdgeKindError(pub String);
