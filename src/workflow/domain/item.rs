//! Workflow item aggregate root.

use super::{ActorRefs, Amount, EntityType, ItemId, Revision, StatusName};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Parameter object for creating a new workflow item at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkflowItem {
    entity_type: EntityType,
    status: StatusName,
    amount: Amount,
    allocated: Option<Amount>,
    due_date: Option<DateTime<Utc>>,
    actors: ActorRefs,
}

impl NewWorkflowItem {
    /// Creates the mandatory fields of a new item.
    ///
    /// `status` must be the initial status of the entity type's graph; the
    /// dispatch service resolves it before calling this.
    #[must_use]
    pub const fn new(
        entity_type: EntityType,
        status: StatusName,
        amount: Amount,
        actors: ActorRefs,
    ) -> Self {
        Self {
            entity_type,
            status,
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

/// Parameter object for reconstructing a persisted workflow item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedWorkflowItemData {
    /// Persisted item identifier.
    pub id: ItemId,
    /// Persisted entity type.
    pub entity_type: EntityType,
    /// Persisted status. Graph membership is checked at each use site, not
    /// here; an out-of-graph status surfaces as `InvalidState` downstream.
    pub status: StatusName,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted concurrency revision.
    pub revision: Revision,
    /// Persisted designated amount (amount due, estimated cost, or budget,
    /// depending on the entity type).
    pub amount: Amount,
    /// Persisted budget allocation, if the line carries one.
    pub allocated: Option<Amount>,
    /// Persisted due date, if any.
    pub due_date: Option<DateTime<Utc>>,
    /// Persisted actor references.
    pub actors: ActorRefs,
}

/// Workflow item aggregate root.
///
/// Read-only outside the crate except through transition application; the
/// dispatch service is the sole place a status changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowItem {
    id: ItemId,
    entity_type: EntityType,
    status: StatusName,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    revision: Revision,
    amount: Amount,
    allocated: Option<Amount>,
    due_date: Option<DateTime<Utc>>,
    actors: ActorRefs,
}

impl WorkflowItem {
    /// Creates a new workflow item from submission data.
    #[must_use]
    pub fn new(data: NewWorkflowItem, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ItemId::new(),
            entity_type: data.entity_type,
            status: data.status,
            created_at: timestamp,
            updated_at: timestamp,
            revision: Revision::initial(),
            amount: data.amount,
            allocated: data.allocated,
            due_date: data.due_date,
            actors: data.actors,
        }
    }

    /// Reconstructs a workflow item from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedWorkflowItemData) -> Self {
        Self {
            id: data.id,
            entity_type: data.entity_type,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
            revision: data.revision,
            amount: data.amount,
            allocated: data.allocated,
            due_date: data.due_date,
            actors: data.actors,
        }
    }

    /// Returns the item identifier.
    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// Returns the entity type.
    #[must_use]
    pub const fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> &StatusName {
        &self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the concurrency revision.
    #[must_use]
    pub const fn revision(&self) -> Revision {
        self.revision
    }

    /// Returns the designated amount for the entity type.
    #[must_use]
    pub const fn amount(&self) -> Amount {
        self.amount
    }

    /// Returns the allocated budget, if the line carries one.
    #[must_use]
    pub const fn allocated(&self) -> Option<Amount> {
        self.allocated
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the actor references.
    #[must_use]
    pub const fn actors(&self) -> &ActorRefs {
        &self.actors
    }

    /// Returns whether the due date exists and has elapsed at `now`.
    ///
    /// Terminality is the aggregator's concern; this only compares dates.
    #[must_use]
    pub fn due_elapsed(&self, now: DateTime<Utc>) -> bool {
        self.due_date.is_some_and(|due| due < now)
    }

    /// Records an approved transition on the item.
    ///
    /// Store implementations call this after the guard has allowed the
    /// transition and the revision comparison has passed; it never validates
    /// either. Updates the status, bumps the revision, and touches the
    /// lifecycle timestamp.
    pub fn record_transition(&mut self, to: StatusName, clock: &impl Clock) {
        self.status = to;
        self.revision = self.revision.next();
        self.touch(clock);
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
