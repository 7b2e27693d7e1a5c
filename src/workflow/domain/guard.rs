//! Transition authorization: who may move an item where.

use super::{
    ActorContext, Role, StateMachine, StatusName, UnauthorizedCause, WorkflowDomainError,
    WorkflowItem,
};
use serde::Serialize;
use std::sync::Arc;

/// A transition an actor may apply to an item right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableAction {
    /// Target status of the transition.
    pub to: StatusName,
    /// Role the transition requires.
    pub required_role: Role,
}

/// Centralized authorization for workflow transitions.
///
/// Every rule that used to be duplicated per button or menu item lives
/// here: the UI asks once per action instead of re-deriving role checks.
#[derive(Debug, Clone)]
pub struct TransitionGuard {
    machine: Arc<StateMachine>,
}

impl TransitionGuard {
    /// Creates a guard over the state machine.
    #[must_use]
    pub const fn new(machine: Arc<StateMachine>) -> Self {
        Self { machine }
    }

    /// Evaluates whether the actor may move the item to `to`.
    ///
    /// Checks run in a fixed order: status validity, finalization, edge
    /// existence, required role, separation of duties, then edge
    /// preconditions. Self-approval is denied regardless of role.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as a [`WorkflowDomainError`]:
    /// `InvalidState`, `AlreadyFinalized`, `IllegalTransition`,
    /// `Unauthorized`, or `PreconditionFailed`.
    pub fn evaluate(
        &self,
        actor: &ActorContext,
        item: &WorkflowItem,
        to: &StatusName,
    ) -> Result<(), WorkflowDomainError> {
        let entity_type = item.entity_type();
        let graph = self.machine.graph(entity_type);
        graph.require_known(item.status())?;

        if graph.is_terminal(item.status()) {
            return Err(WorkflowDomainError::AlreadyFinalized {
                status: item.status().clone(),
            });
        }

        let edge = graph.edge(item.status(), to).ok_or_else(|| {
            WorkflowDomainError::IllegalTransition {
                entity_type,
                from: item.status().clone(),
                to: to.clone(),
            }
        })?;

        if actor.role() != edge.required_role() {
            return Err(WorkflowDomainError::Unauthorized {
                to: to.clone(),
                cause: UnauthorizedCause::RoleMismatch {
                    required: edge.required_role(),
                    actual: actor.role(),
                },
            });
        }

        if edge.requires_separation() && actor.actor() == item.actors().submitter() {
            return Err(WorkflowDomainError::Unauthorized {
                to: to.clone(),
                cause: UnauthorizedCause::SelfApproval,
            });
        }

        for rule in edge.rules() {
            if !rule.evaluate(item) {
                return Err(WorkflowDomainError::PreconditionFailed {
                    rule: rule.as_str().to_owned(),
                    to: to.clone(),
                });
            }
        }

        Ok(())
    }

    /// Returns the transitions the actor may apply to the item, derived
    /// from the state machine and filtered through [`Self::evaluate`].
    #[must_use]
    pub fn allowed_actions(
        &self,
        actor: &ActorContext,
        item: &WorkflowItem,
    ) -> Vec<AvailableAction> {
        self.machine
            .graph(item.entity_type())
            .outgoing(item.status())
            .filter(|edge| self.evaluate(actor, item, edge.to()).is_ok())
            .map(|edge| AvailableAction {
                to: edge.to().clone(),
                required_role: edge.required_role(),
            })
            .collect()
    }
}
