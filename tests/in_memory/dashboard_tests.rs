//! In-memory integration tests for dashboard metric aggregation.

use super::helpers::{
    actor, advance, build_service, invoice_request, requisition_request, status,
};
use chrono::{TimeZone, Utc};
use palladio::workflow::{
    adapters::memory::StaticAuthContext,
    domain::{Amount, EntityType, Role},
    ports::AuthContext,
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dashboard_counts_cover_every_status() {
    let (_, service) = build_service();

    let first = service
        .submit_item(invoice_request(300))
        .await
        .expect("submission should succeed");
    service
        .submit_item(invoice_request(200))
        .await
        .expect("submission should succeed");
    advance(&service, &first, "approved").await;

    let metrics = service
        .dashboard_metrics(EntityType::Invoice)
        .await
        .expect("metrics should aggregate");

    assert_eq!(metrics.counts_by_status.get(&status("pending")), Some(&1));
    assert_eq!(metrics.counts_by_status.get(&status("approved")), Some(&1));
    assert_eq!(metrics.counts_by_status.get(&status("paid")), Some(&0));
    assert_eq!(metrics.counts_by_status.get(&status("rejected")), Some(&0));
    assert_eq!(metrics.total_amount.minor_units(), 500);
    assert_eq!(metrics.invalid_state_count, 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn overdue_counts_exclude_settled_invoices() {
    let (_, service) = build_service();
    let long_past = Utc
        .with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
        .single()
        .expect("valid timestamp");

    let open_overdue = invoice_request(300).with_due_date(long_past);
    service
        .submit_item(open_overdue)
        .await
        .expect("submission should succeed");

    let settled = service
        .submit_item(invoice_request(200).with_due_date(long_past))
        .await
        .expect("submission should succeed");
    let approved = advance(&service, &settled, "approved").await;
    advance(&service, &approved, "paid").await;

    let metrics = service
        .dashboard_metrics(EntityType::Invoice)
        .await
        .expect("metrics should aggregate");

    assert_eq!(metrics.overdue_count, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn budget_utilization_reflects_live_requisitions() {
    let (_, service) = build_service();

    service
        .submit_item(requisition_request(400).with_allocated(Amount::from_minor_units(1_000)))
        .await
        .expect("submission should succeed");
    let doomed = service
        .submit_item(requisition_request(600))
        .await
        .expect("submission should succeed");
    let reviewed = advance(&service, &doomed, "under_review").await;
    advance(&service, &reviewed, "rejected").await;

    let metrics = service
        .dashboard_metrics(EntityType::Requisition)
        .await
        .expect("metrics should aggregate");

    // Only the live requisition consumes its allocation.
    assert_eq!(metrics.utilization_percent, 40);
    assert_eq!(metrics.total_amount.minor_units(), 1_000);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn allowed_actions_drive_dashboard_buttons_per_role() {
    let (_, service) = build_service();

    let submitted = service
        .submit_item(requisition_request(250_000))
        .await
        .expect("submission should succeed");
    let reviewed = advance(&service, &submitted, "under_review").await;

    // The session layer hands the guard one actor context per request.
    let session = StaticAuthContext::new(actor(Role::Approver));
    assert_eq!(session.current_role(), Role::Approver);

    let approver_actions = service.allowed_actions(&session.current_actor(), &reviewed);
    let targets: Vec<_> = approver_actions
        .iter()
        .map(|action| action.to.clone())
        .collect();
    assert!(targets.contains(&status("approved")));
    assert!(targets.contains(&status("rejected")));

    assert!(
        service
            .allowed_actions(&actor(Role::Vendor), &reviewed)
            .is_empty()
    );
}
