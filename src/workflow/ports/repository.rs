//! Store port for workflow item persistence and transition application.

use crate::workflow::domain::{ActorId, EntityType, ItemId, Revision, StatusName, WorkflowItem};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for workflow store operations.
pub type WorkflowStoreResult<T> = Result<T, WorkflowStoreError>;

/// Filter for listing workflow items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    status: Option<StatusName>,
    submitter: Option<ActorId>,
}

impl ItemFilter {
    /// Matches every item of the listed entity type.
    #[must_use]
    pub const fn any() -> Self {
        Self {
            status: None,
            submitter: None,
        }
    }

    /// Restricts the listing to one status.
    #[must_use]
    pub fn with_status(mut self, status: StatusName) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts the listing to one submitting actor.
    #[must_use]
    pub const fn with_submitter(mut self, submitter: ActorId) -> Self {
        self.submitter = Some(submitter);
        self
    }

    /// Returns whether the item satisfies the filter.
    #[must_use]
    pub fn matches(&self, item: &WorkflowItem) -> bool {
        self.status
            .as_ref()
            .is_none_or(|status| item.status() == status)
            && self
                .submitter
                .is_none_or(|submitter| item.actors().submitter() == submitter)
    }
}

/// Workflow item persistence contract.
///
/// The store owns the items; the core reads them and changes status solely
/// through [`WorkflowItemStore::apply_transition`], which must provide
/// compare-and-swap semantics on the item revision.
#[async_trait]
pub trait WorkflowItemStore: Send + Sync {
    /// Stores a newly submitted item.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::DuplicateItem`] when the identifier
    /// already exists.
    async fn store(&self, item: &WorkflowItem) -> WorkflowStoreResult<()>;

    /// Finds an item by identifier.
    ///
    /// Returns `None` when the item does not exist.
    async fn get(&self, id: ItemId) -> WorkflowStoreResult<Option<WorkflowItem>>;

    /// Lists items of one entity type satisfying the filter.
    async fn list(
        &self,
        entity_type: EntityType,
        filter: &ItemFilter,
    ) -> WorkflowStoreResult<Vec<WorkflowItem>>;

    /// Applies an already-authorized transition with optimistic concurrency.
    ///
    /// Implementations must compare `expected` against the persisted
    /// revision and reject with [`WorkflowStoreError::Conflict`] when they
    /// differ, rather than silently overwriting. Two concurrent calls with
    /// the same expected revision must yield exactly one success.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::NotFound`] for an unknown item or
    /// [`WorkflowStoreError::Conflict`] on a revision mismatch.
    async fn apply_transition(
        &self,
        id: ItemId,
        to: &StatusName,
        expected: Revision,
    ) -> WorkflowStoreResult<WorkflowItem>;
}

/// Errors returned by workflow store implementations.
#[derive(Debug, Clone, Error)]
pub enum WorkflowStoreError {
    /// An item with the same identifier already exists.
    #[error("duplicate workflow item: {0}")]
    DuplicateItem(ItemId),

    /// The item was not found.
    #[error("workflow item not found: {0}")]
    NotFound(ItemId),

    /// The caller's observed revision no longer matches the persisted one.
    #[error("concurrent update on {id}: expected {expected}, found {actual}")]
    Conflict {
        /// The contested item.
        id: ItemId,
        /// Revision the caller observed.
        expected: Revision,
        /// Revision currently persisted.
        actual: Revision,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkflowStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
