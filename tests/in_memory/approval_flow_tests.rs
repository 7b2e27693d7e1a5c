//! In-memory integration tests for full approval lifecycles.

use super::helpers::{actor, advance, build_service, invoice_request, requisition_request, status};
use palladio::workflow::{
    domain::{EntityType, Revision, Role},
    ports::WorkflowItemStore,
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn requisition_travels_the_full_happy_path() {
    let (store, service) = build_service();

    let submitted = service
        .submit_item(requisition_request(250_000))
        .await
        .expect("submission should succeed");
    assert_eq!(submitted.status(), &status("submitted"));

    let reviewed = advance(&service, &submitted, "under_review").await;
    let approved = advance(&service, &reviewed, "approved").await;
    let delivered = advance(&service, &approved, "delivered").await;

    assert_eq!(delivered.status(), &status("delivered"));
    assert_eq!(delivered.revision(), Revision::from_value(4));

    let persisted = store
        .get(submitted.id())
        .await
        .expect("lookup should succeed")
        .expect("item should exist");
    assert_eq!(persisted, delivered);

    let percent = service
        .completion_percent(&delivered)
        .expect("completion should derive");
    assert_eq!(percent, 100);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn timeline_follows_the_lifecycle_as_it_progresses() {
    let (_, service) = build_service();

    let submitted = service
        .submit_item(requisition_request(250_000))
        .await
        .expect("submission should succeed");
    let reviewed = advance(&service, &submitted, "under_review").await;
    let approved = advance(&service, &reviewed, "approved").await;

    let timeline = service
        .compute_timeline(&approved)
        .expect("timeline should reconstruct");

    assert_eq!(timeline.len(), 3);
    let current: Vec<_> = timeline.iter().filter(|step| step.current).collect();
    assert_eq!(current.len(), 1);
    assert_eq!(
        current.first().map(|step| step.status.clone()),
        Some(status("approved"))
    );

    let delivered = advance(&service, &approved, "delivered").await;
    let final_timeline = service
        .compute_timeline(&delivered)
        .expect("timeline should reconstruct");
    assert_eq!(final_timeline.len(), 4);
    assert!(final_timeline.iter().all(|step| step.completed));
    assert!(final_timeline.iter().all(|step| !step.current));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_invoice_finalizes_with_a_failure_step() {
    let (_, service) = build_service();

    let pending = service
        .submit_item(invoice_request(50_000))
        .await
        .expect("submission should succeed");
    let rejected = advance(&service, &pending, "rejected").await;

    let timeline = service
        .compute_timeline(&rejected)
        .expect("timeline should reconstruct");
    assert!(
        timeline
            .last()
            .is_some_and(|step| step.terminal_failure && step.completed)
    );
    assert!(timeline.iter().all(|step| !step.current));

    assert!(
        service
            .allowed_actions(&actor(Role::Finance), &rejected)
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn vendor_registration_reaches_activation() {
    let (_, service) = build_service();

    let submitted = service
        .submit_item(super::helpers::vendor_registration_request())
        .await
        .expect("submission should succeed");

    let reviewed = advance(&service, &submitted, "under_review").await;
    let verified = advance(&service, &reviewed, "verified").await;
    let activated = advance(&service, &verified, "approved").await;

    assert_eq!(activated.status(), &status("approved"));
    assert_eq!(activated.entity_type(), EntityType::VendorRegistration);

    let percent = service
        .completion_percent(&activated)
        .expect("completion should derive");
    assert_eq!(percent, 100);
}
