//! Given steps for workflow transition BDD scenarios.

use super::world::{WorkflowTransitionWorld, run_async};
use eyre::WrapErr;
use palladio::workflow::{
    domain::{ActorContext, ActorRefs, Amount, EntityType, StatusName},
    services::SubmitItemRequest,
};
use rstest_bdd_macros::given;

fn submit(
    world: &mut WorkflowTransitionWorld,
    entity_type: EntityType,
    amount: u64,
) -> Result<(), eyre::Report> {
    let request = SubmitItemRequest::new(
        entity_type,
        Amount::from_minor_units(amount),
        ActorRefs::new(world.submitter),
    );
    let item = run_async(world.service.submit_item(request))
        .wrap_err("submit item for transition scenario")?;
    world.item = Some(item);
    Ok(())
}

#[given("a submitted requisition worth {amount:u64}")]
fn submitted_requisition(
    world: &mut WorkflowTransitionWorld,
    amount: u64,
) -> Result<(), eyre::Report> {
    submit(world, EntityType::Requisition, amount)
}

#[given("a submitted invoice worth {amount:u64}")]
fn submitted_invoice(
    world: &mut WorkflowTransitionWorld,
    amount: u64,
) -> Result<(), eyre::Report> {
    submit(world, EntityType::Invoice, amount)
}

#[given(r#"the requisition has been moved to "{target}""#)]
fn item_has_been_moved(
    world: &mut WorkflowTransitionWorld,
    target: String,
) -> Result<(), eyre::Report> {
    let item = world
        .item
        .clone()
        .ok_or_else(|| eyre::eyre!("missing item in scenario world"))?;
    let to = StatusName::new(target.as_str())?;

    let required_role = world
        .service
        .machine()
        .graph(item.entity_type())
        .edge(item.status(), &to)
        .map(|edge| edge.required_role())
        .ok_or_else(|| eyre::eyre!("no transition edge to '{to}' in scenario setup"))?;

    let actor = ActorContext::new(
        palladio::workflow::domain::ActorId::new(),
        required_role,
    );
    let updated = run_async(
        world
            .service
            .request_transition(&item, &to, actor, item.revision()),
    )
    .wrap_err("advance item in scenario setup")?;

    world.item = Some(updated);
    Ok(())
}
