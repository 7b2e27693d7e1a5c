//! Shared helpers for the in-memory integration suites.

use mockable::DefaultClock;
use palladio::workflow::{
    adapters::memory::InMemoryWorkflowItemStore,
    domain::{
        ActorContext, ActorId, ActorRefs, Amount, EntityType, Role, StatusName, WorkflowItem,
    },
    services::{ActionDispatchService, SubmitItemRequest},
};
use std::sync::Arc;

/// Service type used by the integration suites.
pub type TestService = ActionDispatchService<InMemoryWorkflowItemStore, DefaultClock>;

/// Builds a dispatch service over a fresh in-memory store.
pub fn build_service() -> (Arc<InMemoryWorkflowItemStore>, TestService) {
    let store = Arc::new(InMemoryWorkflowItemStore::new());
    let service = ActionDispatchService::builtin(Arc::clone(&store), Arc::new(DefaultClock))
        .expect("builtin configuration should validate");
    (store, service)
}

/// Parses a status name literal.
pub fn status(name: &str) -> StatusName {
    StatusName::new(name).expect("valid status name")
}

/// A fresh actor holding the given role.
pub fn actor(role: Role) -> ActorContext {
    ActorContext::new(ActorId::new(), role)
}

/// Submission request for a requisition.
pub fn requisition_request(minor_units: u64) -> SubmitItemRequest {
    SubmitItemRequest::new(
        EntityType::Requisition,
        Amount::from_minor_units(minor_units),
        ActorRefs::new(ActorId::new()),
    )
}

/// Submission request for an invoice.
pub fn invoice_request(minor_units: u64) -> SubmitItemRequest {
    SubmitItemRequest::new(
        EntityType::Invoice,
        Amount::from_minor_units(minor_units),
        ActorRefs::new(ActorId::new()),
    )
}

/// Submission request for a vendor registration.
pub fn vendor_registration_request() -> SubmitItemRequest {
    let vendor = ActorId::new();
    SubmitItemRequest::new(
        EntityType::VendorRegistration,
        Amount::ZERO,
        ActorRefs::new(vendor).with_vendor(vendor),
    )
}

/// Applies a transition as a fresh actor holding the edge's required role.
pub async fn advance(service: &TestService, item: &WorkflowItem, target: &str) -> WorkflowItem {
    let to = status(target);
    let required_role = service
        .machine()
        .graph(item.entity_type())
        .edge(item.status(), &to)
        .map(|edge| edge.required_role())
        .expect("transition edge should exist");

    service
        .request_transition(item, &to, actor(required_role), item.revision())
        .await
        .expect("transition should succeed")
}
