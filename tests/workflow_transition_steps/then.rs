//! Then steps for workflow transition BDD scenarios.

use super::world::WorkflowTransitionWorld;
use palladio::workflow::{
    domain::{StatusName, WorkflowDomainError},
    ports::WorkflowStoreError,
    services::ActionDispatchError,
};
use rstest_bdd_macros::then;

#[then(r#"the item status is "{expected}""#)]
fn item_status_is(
    world: &WorkflowTransitionWorld,
    expected: String,
) -> Result<(), eyre::Report> {
    let expected_status = StatusName::new(expected.as_str())?;
    let item = world
        .item
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing item in scenario world"))?;

    if item.status() != &expected_status {
        return Err(eyre::eyre!(
            "expected status {expected_status}, found {}",
            item.status()
        ));
    }
    Ok(())
}

#[then("the transition is denied as unauthorised")]
fn transition_denied_unauthorised(world: &WorkflowTransitionWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_transition_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing transition result"))?;

    if !matches!(
        result,
        Err(ActionDispatchError::Domain(
            WorkflowDomainError::Unauthorized { .. }
        ))
    ) {
        return Err(eyre::eyre!("expected Unauthorized error, got {result:?}"));
    }
    Ok(())
}

#[then("the transition fails with a conflict")]
fn transition_fails_with_conflict(world: &WorkflowTransitionWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_transition_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing transition result"))?;

    if !matches!(
        result,
        Err(ActionDispatchError::Store(
            WorkflowStoreError::Conflict { .. }
        ))
    ) {
        return Err(eyre::eyre!("expected Conflict error, got {result:?}"));
    }
    Ok(())
}
