//! Action dispatch service: the single entry point through which item
//! statuses change, plus the read-side derivations the UI layer consumes.

use crate::workflow::{
    domain::{
        ActorContext, ActorRefs, Amount, AvailableAction, EntityType, GraphConfigError, ItemId,
        MetricsAggregator, NewWorkflowItem, Revision, StateMachine, StatusName, TimelineError,
        TimelineReconstructor, TimelineStep, TransitionGuard, WorkflowDomainError, WorkflowItem,
        WorkflowMetrics,
    },
    ports::{ItemFilter, WorkflowItemStore, WorkflowStoreError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for submitting a new workflow item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitItemRequest {
    entity_type: EntityType,
    amount: Amount,
    allocated: Option<Amount>,
    due_date: Option<DateTime<Utc>>,
    actors: ActorRefs,
}

impl SubmitItemRequest {
    /// Creates a request with the mandatory fields.
    #[must_use]
    pub const fn new(entity_type: EntityType, amount: Amount, actors: ActorRefs) -> Self {
        Self {
            entity_type,
            amount,
            allocated: None,
            due_date: None,
            actors,
        }
    }

    /// Sets the allocated budget for the line.
    #[must_use]
    pub const fn with_allocated(mut self, allocated: Amount) -> Self {
        self.allocated = Some(allocated);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Service-level errors for workflow dispatch operations.
#[derive(Debug, Error)]
pub enum ActionDispatchError {
    /// Transition validation or authorization failed.
    #[error(transparent)]
    Domain(#[from] WorkflowDomainError),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] WorkflowStoreError),

    /// Timeline derivation failed.
    #[error(transparent)]
    Timeline(#[from] TimelineError),
}

/// Result type for workflow dispatch operations.
pub type ActionDispatchResult<T> = Result<T, ActionDispatchError>;

/// Orchestrates guard, state machine, and store for every status change,
/// and exposes the derived views (timelines, allowed actions, metrics).
#[derive(Clone)]
pub struct ActionDispatchService<S, C>
where
    S: WorkflowItemStore,
    C: Clock + Send + Sync,
{
    machine: Arc<StateMachine>,
    guard: TransitionGuard,
    reconstructor: TimelineReconstructor,
    aggregator: MetricsAggregator,
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> ActionDispatchService<S, C>
where
    S: WorkflowItemStore,
    C: Clock + Send + Sync,
{
    /// Creates a dispatch service over the given state machine and
    /// reconstructor.
    #[must_use]
    pub fn new(
        machine: Arc<StateMachine>,
        reconstructor: TimelineReconstructor,
        store: Arc<S>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            guard: TransitionGuard::new(Arc::clone(&machine)),
            aggregator: MetricsAggregator::new(Arc::clone(&machine)),
            machine,
            reconstructor,
            store,
            clock,
        }
    }

    /// Creates a dispatch service over the builtin graphs, schedule, and
    /// descriptions.
    ///
    /// # Errors
    ///
    /// Returns [`GraphConfigError`] if the builtin definitions fail
    /// validation.
    pub fn builtin(store: Arc<S>, clock: Arc<C>) -> Result<Self, GraphConfigError> {
        let machine = Arc::new(StateMachine::builtin()?);
        let reconstructor = TimelineReconstructor::builtin(Arc::clone(&machine))?;
        Ok(Self::new(machine, reconstructor, store, clock))
    }

    /// Returns the state machine the service dispatches against.
    #[must_use]
    pub const fn machine(&self) -> &Arc<StateMachine> {
        &self.machine
    }

    /// Submits a new item at its entity type's initial status.
    ///
    /// # Errors
    ///
    /// Returns [`ActionDispatchError::Store`] when persistence rejects the
    /// item.
    pub async fn submit_item(
        &self,
        request: SubmitItemRequest,
    ) -> ActionDispatchResult<WorkflowItem> {
        let initial = self.machine.initial_status(request.entity_type).clone();
        let mut data = NewWorkflowItem::new(
            request.entity_type,
            initial,
            request.amount,
            request.actors,
        );
        if let Some(allocated) = request.allocated {
            data = data.with_allocated(allocated);
        }
        if let Some(due_date) = request.due_date {
            data = data.with_due_date(due_date);
        }

        let item = WorkflowItem::new(data, &*self.clock);
        self.store.store(&item).await?;
        Ok(item)
    }

    /// Requests a status transition on behalf of an actor.
    ///
    /// The sole mutation path for item statuses. The guard authorizes the
    /// transition against the item as the caller observed it; the store
    /// then applies it with optimistic concurrency against `expected`, so
    /// two racing callers holding the same revision see exactly one
    /// success and one conflict.
    ///
    /// # Errors
    ///
    /// Returns a domain denial, [`WorkflowStoreError::NotFound`] for an
    /// unknown item, or [`WorkflowStoreError::Conflict`] when another
    /// writer got there first.
    pub async fn request_transition(
        &self,
        item: &WorkflowItem,
        to: &StatusName,
        actor: ActorContext,
        expected: Revision,
    ) -> ActionDispatchResult<WorkflowItem> {
        self.guard.evaluate(&actor, item, to)?;
        Ok(self.store.apply_transition(item.id(), to, expected).await?)
    }

    /// Loads an item by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::NotFound`] when the item does not
    /// exist; callers fall back to the template timeline for entities that
    /// have not been submitted yet.
    pub async fn load_item(&self, id: ItemId) -> ActionDispatchResult<WorkflowItem> {
        Ok(self
            .store
            .get(id)
            .await?
            .ok_or(WorkflowStoreError::NotFound(id))?)
    }

    /// Returns the transitions the actor may apply to the item right now.
    #[must_use]
    pub fn allowed_actions(
        &self,
        actor: &ActorContext,
        item: &WorkflowItem,
    ) -> Vec<AvailableAction> {
        self.guard.allowed_actions(actor, item)
    }

    /// Reconstructs the audit timeline for an item.
    ///
    /// # Errors
    ///
    /// Returns [`ActionDispatchError::Timeline`] for an out-of-graph status
    /// or a template failure.
    pub fn compute_timeline(
        &self,
        item: &WorkflowItem,
    ) -> ActionDispatchResult<Vec<TimelineStep>> {
        Ok(self.reconstructor.reconstruct(
            item.entity_type(),
            item.created_at(),
            item.updated_at(),
            item.status(),
        )?)
    }

    /// Builds the template timeline for an entity that does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`ActionDispatchError::Timeline`] on a template failure.
    pub fn compute_template_timeline(
        &self,
        entity_type: EntityType,
    ) -> ActionDispatchResult<Vec<TimelineStep>> {
        Ok(self.reconstructor.template(entity_type, self.clock.utc())?)
    }

    /// Returns lifecycle progress for an item as a percentage.
    ///
    /// # Errors
    ///
    /// Returns [`ActionDispatchError::Domain`] for an out-of-graph status.
    pub fn completion_percent(&self, item: &WorkflowItem) -> ActionDispatchResult<u8> {
        Ok(self
            .machine
            .completion_percent(item.entity_type(), item.status())?)
    }

    /// Aggregates metrics over an already-loaded item collection.
    #[must_use]
    pub fn aggregate_metrics(
        &self,
        entity_type: EntityType,
        items: &[WorkflowItem],
    ) -> WorkflowMetrics {
        self.aggregator
            .aggregate(entity_type, items, self.clock.utc())
    }

    /// Loads every item of one entity type and aggregates its dashboard
    /// metrics.
    ///
    /// # Errors
    ///
    /// Returns [`ActionDispatchError::Store`] when the listing fails.
    pub async fn dashboard_metrics(
        &self,
        entity_type: EntityType,
    ) -> ActionDispatchResult<WorkflowMetrics> {
        let items = self.store.list(entity_type, &ItemFilter::any()).await?;
        Ok(self.aggregate_metrics(entity_type, &items))
    }
}
