//! Filesystem loader for workflow definitions.
//!
//! Graphs, step offsets, and description templates are deployment data: a
//! JSON definition file read through a capability-scoped directory handle
//! at process start. Every structural violation surfaces as the fatal
//! [`GraphConfigError`]; a process must not start on a malformed
//! definition.

use cap_std::ambient_authority;
use cap_std::fs::Dir;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::workflow::domain::{
    EdgeKind, EntityType, GraphConfigError, ParseEdgeKindError, ParseEntityTypeError,
    ParseRoleError, ParseRuleError, ParseStatusError, Role, StatusGraph, StatusName,
    StepDescriptions, StepSchedule, TransitionEdge, TransitionRule, WorkflowGraphs,
};

/// Errors raised while loading a workflow definition file.
#[derive(Debug, Error)]
pub enum WorkflowConfigError {
    /// The definition file could not be read.
    #[error("failed to read workflow definition: {0}")]
    Io(#[from] std::io::Error),

    /// The definition file is not valid JSON.
    #[error("failed to parse workflow definition: {0}")]
    Parse(#[from] serde_json::Error),

    /// The definition violates graph structure rules.
    #[error(transparent)]
    Graph(#[from] GraphConfigError),

    /// An entity type string is unknown.
    #[error(transparent)]
    EntityType(#[from] ParseEntityTypeError),

    /// A role string is unknown.
    #[error(transparent)]
    Role(#[from] ParseRoleError),

    /// A status name is malformed.
    #[error(transparent)]
    Status(#[from] ParseStatusError),

    /// A precondition rule string is unknown.
    #[error(transparent)]
    Rule(#[from] ParseRuleError),

    /// An edge kind string is unknown.
    #[error(transparent)]
    Kind(#[from] ParseEdgeKindError),
}

/// Serde model of the definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowDefinition {
    graphs: Vec<GraphDefinition>,
    #[serde(default)]
    offsets: BTreeMap<String, BTreeMap<String, u32>>,
    #[serde(default)]
    descriptions: BTreeMap<String, BTreeMap<String, String>>,
}

/// Serde model of one graph in the definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphDefinition {
    entity_type: String,
    initial: String,
    #[serde(default)]
    statuses: Vec<String>,
    terminals: Vec<String>,
    edges: Vec<EdgeDefinition>,
}

/// Serde model of one transition edge in the definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeDefinition {
    from: String,
    to: String,
    role: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    canonical: bool,
    #[serde(default)]
    requires_separation: bool,
    #[serde(default)]
    rules: Vec<String>,
}

/// A fully converted and validated workflow configuration.
#[derive(Debug, Clone)]
pub struct LoadedWorkflowConfig {
    /// The validated graphs, one per entity type.
    pub graphs: WorkflowGraphs,
    /// The step offset table.
    pub schedule: StepSchedule,
    /// The description template table.
    pub descriptions: StepDescriptions,
}

/// Opens a definition directory from an ambient path.
///
/// # Errors
///
/// Returns the underlying I/O error when the directory cannot be opened.
pub fn open_definition_dir(path: &Path) -> std::io::Result<Dir> {
    Dir::open_ambient_dir(path, ambient_authority())
}

/// Reads and validates a workflow definition file.
///
/// # Errors
///
/// Returns [`WorkflowConfigError`] on I/O failure, malformed JSON, unknown
/// enumeration strings, or structural graph violations. All of these are
/// startup-time fatal for the host.
pub fn load_workflow_config(
    dir: &Dir,
    file_name: &str,
) -> Result<LoadedWorkflowConfig, WorkflowConfigError> {
    let raw = dir.read_to_string(file_name)?;
    let definition: WorkflowDefinition = serde_json::from_str(&raw)?;
    LoadedWorkflowConfig::try_from(definition)
}

impl TryFrom<WorkflowDefinition> for LoadedWorkflowConfig {
    type Error = WorkflowConfigError;

    fn try_from(definition: WorkflowDefinition) -> Result<Self, Self::Error> {
        let graphs = definition
            .graphs
            .into_iter()
            .map(build_graph)
            .collect::<Result<Vec<_>, _>>()?;

        let mut schedule = StepSchedule::empty();
        for (entity_type_raw, by_status) in &definition.offsets {
            let entity_type = EntityType::try_from(entity_type_raw.as_str())?;
            for (status_raw, days) in by_status {
                schedule =
                    schedule.with_offset(entity_type, StatusName::new(status_raw.as_str())?, *days);
            }
        }

        let mut descriptions = StepDescriptions::empty();
        for (entity_type_raw, by_status) in &definition.descriptions {
            let entity_type = EntityType::try_from(entity_type_raw.as_str())?;
            for (status_raw, template) in by_status {
                descriptions = descriptions.with_template(
                    entity_type,
                    StatusName::new(status_raw.as_str())?,
                    template,
                );
            }
        }

        Ok(Self {
            graphs: WorkflowGraphs::new(graphs)?,
            schedule,
            descriptions,
        })
    }
}

fn build_graph(definition: GraphDefinition) -> Result<StatusGraph, WorkflowConfigError> {
    let entity_type = EntityType::try_from(definition.entity_type.as_str())?;
    let mut builder = StatusGraph::builder(entity_type)
        .initial(StatusName::new(definition.initial.as_str())?);

    for status in &definition.statuses {
        builder = builder.status(StatusName::new(status.as_str())?);
    }
    for terminal in &definition.terminals {
        builder = builder.terminal(StatusName::new(terminal.as_str())?);
    }
    for edge in &definition.edges {
        builder = builder.edge(build_edge(edge)?);
    }

    Ok(builder.build()?)
}

fn build_edge(definition: &EdgeDefinition) -> Result<TransitionEdge, WorkflowConfigError> {
    let mut edge = TransitionEdge::new(
        StatusName::new(definition.from.as_str())?,
        StatusName::new(definition.to.as_str())?,
        Role::try_from(definition.role.as_str())?,
    );

    let kind = match &definition.kind {
        Some(raw) => EdgeKind::try_from(raw.as_str())?,
        None => EdgeKind::Advance,
    };
    if kind == EdgeKind::Failure {
        edge = edge.failure();
    }
    if definition.canonical {
        edge = edge.canonical();
    }
    if definition.requires_separation {
        edge = edge.with_separation_of_duties();
    }
    for rule in &definition.rules {
        edge = edge.with_rule(TransitionRule::try_from(rule.as_str())?);
    }
    Ok(edge)
}
