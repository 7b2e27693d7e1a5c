//! Thread-safe in-memory workflow item store.
//!
//! Backs tests and lightweight hosts. Provides the compare-and-swap
//! guarantee the port demands: revision comparison and mutation happen
//! under one write lock, so concurrent transitions with the same expected
//! revision resolve to exactly one success and one conflict.

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::workflow::{
    domain::{EntityType, ItemId, Revision, StatusName, WorkflowItem},
    ports::{ItemFilter, WorkflowItemStore, WorkflowStoreError, WorkflowStoreResult},
};

/// In-memory implementation of [`WorkflowItemStore`].
pub struct InMemoryWorkflowItemStore<C = DefaultClock>
where
    C: Clock + Send + Sync,
{
    state: Arc<RwLock<StoreState>>,
    clock: Arc<C>,
}

#[derive(Debug, Default)]
struct StoreState {
    items: HashMap<ItemId, WorkflowItem>,
}

impl InMemoryWorkflowItemStore<DefaultClock> {
    /// Creates an empty store using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl Default for InMemoryWorkflowItemStore<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> InMemoryWorkflowItemStore<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty store stamping transitions with the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<C>) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            clock,
        }
    }
}

impl<C> Clone for InMemoryWorkflowItemStore<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

#[async_trait]
impl<C> WorkflowItemStore for InMemoryWorkflowItemStore<C>
where
    C: Clock + Send + Sync,
{
    async fn store(&self, item: &WorkflowItem) -> WorkflowStoreResult<()> {
        let mut state = self.state.write().map_err(|err| {
            WorkflowStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state.items.contains_key(&item.id()) {
            return Err(WorkflowStoreError::DuplicateItem(item.id()));
        }
        state.items.insert(item.id(), item.clone());
        Ok(())
    }

    async fn get(&self, id: ItemId) -> WorkflowStoreResult<Option<WorkflowItem>> {
        let state = self.state.read().map_err(|err| {
            WorkflowStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.items.get(&id).cloned())
    }

    async fn list(
        &self,
        entity_type: EntityType,
        filter: &ItemFilter,
    ) -> WorkflowStoreResult<Vec<WorkflowItem>> {
        let state = self.state.read().map_err(|err| {
            WorkflowStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut items: Vec<WorkflowItem> = state
            .items
            .values()
            .filter(|item| item.entity_type() == entity_type && filter.matches(item))
            .cloned()
            .collect();
        items.sort_by_key(|item| (item.created_at(), item.id()));
        Ok(items)
    }

    async fn apply_transition(
        &self,
        id: ItemId,
        to: &StatusName,
        expected: Revision,
    ) -> WorkflowStoreResult<WorkflowItem> {
        let mut state = self.state.write().map_err(|err| {
            WorkflowStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let item = state
            .items
            .get_mut(&id)
            .ok_or(WorkflowStoreError::NotFound(id))?;

        if item.revision() != expected {
            return Err(WorkflowStoreError::Conflict {
                id,
                expected,
                actual: item.revision(),
            });
        }

        item.record_transition(to.clone(), &*self.clock);
        Ok(item.clone())
    }
}
