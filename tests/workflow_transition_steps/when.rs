//! When steps for workflow transition BDD scenarios.

use super::world::{WorkflowTransitionWorld, run_async};
use palladio::workflow::domain::{ActorContext, ActorId, Role, StatusName};
use rstest_bdd_macros::when;

fn attempt_transition(
    world: &mut WorkflowTransitionWorld,
    actor: ActorContext,
    target: &str,
) -> Result<(), eyre::Report> {
    let item = world
        .item
        .clone()
        .ok_or_else(|| eyre::eyre!("missing item in scenario world"))?;
    let to = StatusName::new(target)?;

    world.replay_snapshot = Some(item.clone());
    let result = run_async(
        world
            .service
            .request_transition(&item, &to, actor, item.revision()),
    );
    if let Ok(ref updated) = result {
        world.item = Some(updated.clone());
    }
    world.last_transition_result = Some(result);
    Ok(())
}

#[when(r#"an approver moves the requisition to "{target}""#)]
fn approver_moves_item(
    world: &mut WorkflowTransitionWorld,
    target: String,
) -> Result<(), eyre::Report> {
    attempt_transition(
        world,
        ActorContext::new(ActorId::new(), Role::Approver),
        target.as_str(),
    )
}

#[when(r#"a vendor tries to move the invoice to "{target}""#)]
fn vendor_tries_to_move_item(
    world: &mut WorkflowTransitionWorld,
    target: String,
) -> Result<(), eyre::Report> {
    attempt_transition(
        world,
        ActorContext::new(ActorId::new(), Role::Vendor),
        target.as_str(),
    )
}

#[when(r#"the submitter tries to move the requisition to "{target}""#)]
fn submitter_tries_to_move_item(
    world: &mut WorkflowTransitionWorld,
    target: String,
) -> Result<(), eyre::Report> {
    let submitter = world.submitter;
    attempt_transition(
        world,
        ActorContext::new(submitter, Role::Approver),
        target.as_str(),
    )
}

#[when("a finance officer approves the invoice")]
fn finance_officer_approves(world: &mut WorkflowTransitionWorld) -> Result<(), eyre::Report> {
    attempt_transition(
        world,
        ActorContext::new(ActorId::new(), Role::Finance),
        "approved",
    )
}

#[when("a second writer replays the previous transition")]
fn second_writer_replays(world: &mut WorkflowTransitionWorld) -> Result<(), eyre::Report> {
    let stale = world
        .replay_snapshot
        .clone()
        .ok_or_else(|| eyre::eyre!("missing replay snapshot in scenario world"))?;

    let result = run_async(world.service.request_transition(
        &stale,
        &StatusName::new("approved")?,
        ActorContext::new(ActorId::new(), Role::Finance),
        stale.revision(),
    ));
    world.last_transition_result = Some(result);
    Ok(())
}
