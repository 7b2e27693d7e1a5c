//! Unit tests for status graph construction and fatal validation.

use super::fixtures::status;
use crate::workflow::domain::{
    EntityType, GraphConfigError, Role, StatusGraph, TransitionEdge, WorkflowGraphs,
};
use rstest::rstest;

fn minimal_graph() -> Result<StatusGraph, GraphConfigError> {
    StatusGraph::builder(EntityType::Requisition)
        .initial(status("submitted"))
        .terminal(status("done"))
        .edge(
            TransitionEdge::new(status("submitted"), status("done"), Role::Approver).canonical(),
        )
        .build()
}

#[rstest]
fn minimal_graph_validates() {
    let graph = minimal_graph().expect("two-status graph should validate");
    assert_eq!(graph.happy_path(), [status("submitted"), status("done")]);
    assert!(graph.is_terminal(&status("done")));
    assert!(!graph.is_terminal(&status("submitted")));
}

#[rstest]
fn builtin_graphs_validate() {
    let graphs = WorkflowGraphs::builtin().expect("builtin graphs should validate");
    for entity_type in EntityType::ALL {
        let graph = graphs.graph(entity_type);
        assert_eq!(graph.entity_type(), entity_type);
        assert!(graph.happy_path().len() >= 2);
    }
}

#[rstest]
fn missing_initial_is_fatal() {
    let result = StatusGraph::builder(EntityType::Invoice)
        .terminal(status("paid"))
        .build();
    assert!(matches!(
        result,
        Err(GraphConfigError::MissingInitial { .. })
    ));
}

#[rstest]
fn missing_terminal_is_fatal() {
    let result = StatusGraph::builder(EntityType::Invoice)
        .initial(status("pending"))
        .build();
    assert!(matches!(
        result,
        Err(GraphConfigError::MissingTerminal { .. })
    ));
}

#[rstest]
fn undeclared_edge_endpoint_is_fatal() {
    let result = StatusGraph::builder(EntityType::Invoice)
        .initial(status("pending"))
        .terminal(status("paid"))
        .edge(TransitionEdge::new(status("pending"), status("ghost"), Role::Finance).canonical())
        .build();
    assert!(matches!(
        result,
        Err(GraphConfigError::UnknownStatus { status: ref s, .. }) if s == &status("ghost")
    ));
}

#[rstest]
fn unreachable_status_is_fatal() {
    let result = StatusGraph::builder(EntityType::Invoice)
        .initial(status("pending"))
        .status(status("island"))
        .terminal(status("paid"))
        .edge(TransitionEdge::new(status("pending"), status("paid"), Role::Finance).canonical())
        .build();
    assert!(matches!(
        result,
        Err(GraphConfigError::UnreachableStatus { status: ref s, .. }) if s == &status("island")
    ));
}

#[rstest]
fn unreachable_terminal_is_fatal() {
    let result = StatusGraph::builder(EntityType::Invoice)
        .initial(status("pending"))
        .terminal(status("paid"))
        .terminal(status("void"))
        .edge(TransitionEdge::new(status("pending"), status("paid"), Role::Finance).canonical())
        .build();
    assert!(matches!(
        result,
        Err(GraphConfigError::UnreachableStatus { status: ref s, .. }) if s == &status("void")
    ));
}

#[rstest]
fn terminal_with_outgoing_edge_is_fatal() {
    let result = StatusGraph::builder(EntityType::Invoice)
        .initial(status("pending"))
        .status(status("review"))
        .terminal(status("paid"))
        .edge(TransitionEdge::new(status("pending"), status("paid"), Role::Finance).canonical())
        .edge(TransitionEdge::new(status("paid"), status("review"), Role::Finance).canonical())
        .build();
    assert!(matches!(
        result,
        Err(GraphConfigError::TerminalWithOutgoing { status: ref s, .. }) if s == &status("paid")
    ));
}

#[rstest]
fn edge_into_initial_is_fatal() {
    let result = StatusGraph::builder(EntityType::Invoice)
        .initial(status("pending"))
        .status(status("review"))
        .terminal(status("paid"))
        .edge(TransitionEdge::new(status("pending"), status("review"), Role::Finance).canonical())
        .edge(TransitionEdge::new(status("review"), status("pending"), Role::Finance))
        .edge(TransitionEdge::new(status("review"), status("paid"), Role::Finance).canonical())
        .build();
    assert!(matches!(
        result,
        Err(GraphConfigError::EdgeIntoInitial { .. })
    ));
}

#[rstest]
fn cycle_through_non_terminal_is_fatal() {
    let result = StatusGraph::builder(EntityType::Invoice)
        .initial(status("pending"))
        .status(status("review"))
        .status(status("rework"))
        .terminal(status("paid"))
        .edge(TransitionEdge::new(status("pending"), status("review"), Role::Finance).canonical())
        .edge(TransitionEdge::new(status("review"), status("rework"), Role::Finance).canonical())
        .edge(TransitionEdge::new(status("rework"), status("review"), Role::Finance))
        .edge(TransitionEdge::new(status("review"), status("paid"), Role::Finance).canonical())
        .build();
    assert!(matches!(result, Err(GraphConfigError::CycleDetected { .. })));
}

#[rstest]
fn missing_canonical_inbound_is_fatal() {
    let result = StatusGraph::builder(EntityType::Invoice)
        .initial(status("pending"))
        .terminal(status("paid"))
        .edge(TransitionEdge::new(status("pending"), status("paid"), Role::Finance))
        .build();
    assert!(matches!(
        result,
        Err(GraphConfigError::MissingCanonicalInbound { status: ref s, .. }) if s == &status("paid")
    ));
}

#[rstest]
fn duplicate_canonical_inbound_is_fatal() {
    let result = StatusGraph::builder(EntityType::Invoice)
        .initial(status("pending"))
        .status(status("review"))
        .terminal(status("paid"))
        .edge(TransitionEdge::new(status("pending"), status("review"), Role::Finance).canonical())
        .edge(TransitionEdge::new(status("pending"), status("paid"), Role::Finance).canonical())
        .edge(TransitionEdge::new(status("review"), status("paid"), Role::Finance).canonical())
        .build();
    assert!(matches!(
        result,
        Err(GraphConfigError::DuplicateCanonicalInbound { status: ref s, .. }) if s == &status("paid")
    ));
}

#[rstest]
fn ambiguous_happy_path_is_fatal() {
    let result = StatusGraph::builder(EntityType::Invoice)
        .initial(status("pending"))
        .terminal(status("paid"))
        .terminal(status("archived"))
        .edge(TransitionEdge::new(status("pending"), status("paid"), Role::Finance).canonical())
        .edge(TransitionEdge::new(status("pending"), status("archived"), Role::Finance).canonical())
        .build();
    assert!(matches!(
        result,
        Err(GraphConfigError::AmbiguousHappyPath { .. })
    ));
}

#[rstest]
fn happy_path_dead_end_is_fatal() {
    let result = StatusGraph::builder(EntityType::Invoice)
        .initial(status("pending"))
        .status(status("review"))
        .terminal(status("paid"))
        .edge(TransitionEdge::new(status("pending"), status("review"), Role::Finance).canonical())
        .edge(
            TransitionEdge::new(status("review"), status("paid"), Role::Finance)
                .failure()
                .canonical(),
        )
        .build();
    assert!(matches!(
        result,
        Err(GraphConfigError::HappyPathDeadEnd { status: ref s, .. }) if s == &status("review")
    ));
}

#[rstest]
fn registry_rejects_duplicate_entity_type() {
    let first = minimal_graph().expect("graph should validate");
    let second = minimal_graph().expect("graph should validate");
    let result = WorkflowGraphs::new([first, second]);
    assert!(matches!(
        result,
        Err(GraphConfigError::DuplicateGraph {
            entity_type: EntityType::Requisition
        })
    ));
}

#[rstest]
fn registry_rejects_missing_entity_type() {
    let only = minimal_graph().expect("graph should validate");
    let result = WorkflowGraphs::new([only]);
    assert!(matches!(
        result,
        Err(GraphConfigError::MissingGraph { .. })
    ));
}
