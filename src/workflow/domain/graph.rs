//! Status graphs: the per-entity-type transition rules as validated data.
//!
//! Graphs are immutable once built. Every structural rule the rest of the
//! crate relies on (reachability, acyclicity, unique canonical inbound
//! edges, terminal statuses without successors, a single happy path) is
//! enforced here, at load time, as a fatal [`GraphConfigError`].

use super::{
    EntityType, GraphConfigError, ParseEdgeKindError, ParseRuleError, Role, StatusName,
    WorkflowDomainError, WorkflowItem,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

/// Whether an edge advances the item or routes it to a failure outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Forward progress along the lifecycle.
    Advance,
    /// Routing to a failure outcome (rejection, cancellation,
    /// disqualification).
    Failure,
}

impl EdgeKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Advance => "advance",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EdgeKind {
    type Error = ParseEdgeKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "advance" => Ok(Self::Advance),
            "failure" => Ok(Self::Failure),
            _ => Err(ParseEdgeKindError(value.to_owned())),
        }
    }
}

/// Declarative precondition attached to a transition edge.
///
/// Rules are data so that graph configuration can attach them without code
/// changes; each evaluates against the item under transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionRule {
    /// The designated amount must be strictly positive.
    AmountPositive,
    /// The item must carry a budget allocation.
    AllocationPresent,
}

impl TransitionRule {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AmountPositive => "amount_positive",
            Self::AllocationPresent => "allocation_present",
        }
    }

    /// Evaluates the rule against an item.
    #[must_use]
    pub fn evaluate(self, item: &WorkflowItem) -> bool {
        match self {
            Self::AmountPositive => !item.amount().is_zero(),
            Self::AllocationPresent => item.allocated().is_some(),
        }
    }
}

impl fmt::Display for TransitionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransitionRule {
    type Error = ParseRuleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "amount_positive" => Ok(Self::AmountPositive),
            "allocation_present" => Ok(Self::AllocationPresent),
            _ => Err(ParseRuleError(value.to_owned())),
        }
    }
}

/// Directed transition edge between two statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEdge {
    from: StatusName,
    to: StatusName,
    required_role: Role,
    kind: EdgeKind,
    canonical: bool,
    requires_separation: bool,
    rules: Vec<TransitionRule>,
}

impl TransitionEdge {
    /// Creates an advance edge with no preconditions.
    #[must_use]
    pub const fn new(from: StatusName, to: StatusName, required_role: Role) -> Self {
        Self {
            from,
            to,
            required_role,
            kind: EdgeKind::Advance,
            canonical: false,
            requires_separation: false,
            rules: Vec::new(),
        }
    }

    /// Marks the edge as a failure route.
    #[must_use]
    pub const fn failure(mut self) -> Self {
        self.kind = EdgeKind::Failure;
        self
    }

    /// Marks the edge as the canonical inbound edge of its target.
    ///
    /// Timeline reconstruction walks canonical edges backwards from the
    /// current status; every non-initial status needs exactly one.
    #[must_use]
    pub const fn canonical(mut self) -> Self {
        self.canonical = true;
        self
    }

    /// Requires separation of duties: the item's submitter may never apply
    /// this edge, regardless of role.
    #[must_use]
    pub const fn with_separation_of_duties(mut self) -> Self {
        self.requires_separation = true;
        self
    }

    /// Attaches a precondition rule.
    #[must_use]
    pub fn with_rule(mut self, rule: TransitionRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Returns the source status.
    #[must_use]
    pub const fn from(&self) -> &StatusName {
        &self.from
    }

    /// Returns the target status.
    #[must_use]
    pub const fn to(&self) -> &StatusName {
        &self.to
    }

    /// Returns the role required to apply the edge.
    #[must_use]
    pub const fn required_role(&self) -> Role {
        self.required_role
    }

    /// Returns whether the edge advances or fails the item.
    #[must_use]
    pub const fn kind(&self) -> EdgeKind {
        self.kind
    }

    /// Returns whether this is the canonical inbound edge of its target.
    #[must_use]
    pub const fn is_canonical(&self) -> bool {
        self.canonical
    }

    /// Returns whether the edge enforces separation of duties.
    #[must_use]
    pub const fn requires_separation(&self) -> bool {
        self.requires_separation
    }

    /// Returns the precondition rules on the edge.
    #[must_use]
    pub fn rules(&self) -> &[TransitionRule] {
        &self.rules
    }
}

/// Builder for a validated [`StatusGraph`].
#[derive(Debug, Clone)]
pub struct StatusGraphBuilder {
    entity_type: EntityType,
    initial: Option<StatusName>,
    statuses: Vec<StatusName>,
    terminals: BTreeSet<StatusName>,
    edges: Vec<TransitionEdge>,
}

impl StatusGraphBuilder {
    /// Creates an empty builder for the entity type.
    #[must_use]
    pub const fn new(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            initial: None,
            statuses: Vec::new(),
            terminals: BTreeSet::new(),
            edges: Vec::new(),
        }
    }

    /// Declares the initial status, registering it as a status.
    #[must_use]
    pub fn initial(mut self, status: StatusName) -> Self {
        self.register(status.clone());
        self.initial = Some(status);
        self
    }

    /// Declares an intermediate status.
    #[must_use]
    pub fn status(mut self, status: StatusName) -> Self {
        self.register(status);
        self
    }

    /// Declares a terminal status, registering it as a status.
    #[must_use]
    pub fn terminal(mut self, status: StatusName) -> Self {
        self.register(status.clone());
        self.terminals.insert(status);
        self
    }

    /// Adds a transition edge.
    #[must_use]
    pub fn edge(mut self, edge: TransitionEdge) -> Self {
        self.edges.push(edge);
        self
    }

    fn register(&mut self, status: StatusName) {
        if !self.statuses.contains(&status) {
            self.statuses.push(status);
        }
    }

    /// Validates and builds the graph.
    ///
    /// # Errors
    ///
    /// Returns [`GraphConfigError`] when the graph is structurally unsound;
    /// see the variant list for the checks applied.
    pub fn build(self) -> Result<StatusGraph, GraphConfigError> {
        let entity_type = self.entity_type;
        let initial = self
            .initial
            .clone()
            .ok_or(GraphConfigError::MissingInitial { entity_type })?;

        if self.terminals.is_empty() {
            return Err(GraphConfigError::MissingTerminal { entity_type });
        }

        self.check_edge_endpoints(&initial)?;
        self.check_terminals_have_no_successors()?;
        self.check_reachability(&initial)?;
        self.check_acyclic()?;
        self.check_canonical_inbound(&initial)?;
        let happy_path = self.trace_happy_path(&initial)?;

        Ok(StatusGraph {
            entity_type,
            initial,
            statuses: self.statuses,
            terminals: self.terminals,
            edges: self.edges,
            happy_path,
        })
    }

    fn check_edge_endpoints(&self, initial: &StatusName) -> Result<(), GraphConfigError> {
        for edge in &self.edges {
            for endpoint in [edge.from(), edge.to()] {
                if !self.statuses.contains(endpoint) {
                    return Err(GraphConfigError::UnknownStatus {
                        entity_type: self.entity_type,
                        status: endpoint.clone(),
                    });
                }
            }
            if edge.to() == initial {
                return Err(GraphConfigError::EdgeIntoInitial {
                    entity_type: self.entity_type,
                    status: initial.clone(),
                });
            }
        }
        Ok(())
    }

    fn check_terminals_have_no_successors(&self) -> Result<(), GraphConfigError> {
        for edge in &self.edges {
            if self.terminals.contains(edge.from()) {
                return Err(GraphConfigError::TerminalWithOutgoing {
                    entity_type: self.entity_type,
                    status: edge.from().clone(),
                });
            }
        }
        Ok(())
    }

    fn check_reachability(&self, initial: &StatusName) -> Result<(), GraphConfigError> {
        let mut reached = BTreeSet::from([initial.clone()]);
        let mut frontier = VecDeque::from([initial.clone()]);
        while let Some(current) = frontier.pop_front() {
            for edge in self.edges.iter().filter(|edge| edge.from() == &current) {
                if reached.insert(edge.to().clone()) {
                    frontier.push_back(edge.to().clone());
                }
            }
        }

        for status in &self.statuses {
            if !reached.contains(status) {
                return Err(GraphConfigError::UnreachableStatus {
                    entity_type: self.entity_type,
                    status: status.clone(),
                });
            }
        }
        Ok(())
    }

    fn check_acyclic(&self) -> Result<(), GraphConfigError> {
        let mut inbound: BTreeMap<&StatusName, usize> =
            self.statuses.iter().map(|status| (status, 0)).collect();
        for edge in &self.edges {
            if let Some(count) = inbound.get_mut(edge.to()) {
                *count = count.saturating_add(1);
            }
        }

        let mut queue: VecDeque<&StatusName> = inbound
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(status, _)| *status)
            .collect();
        let mut processed = 0_usize;
        while let Some(current) = queue.pop_front() {
            processed = processed.saturating_add(1);
            for edge in self.edges.iter().filter(|edge| edge.from() == current) {
                if let Some(count) = inbound.get_mut(edge.to()) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        queue.push_back(edge.to());
                    }
                }
            }
        }

        if processed < self.statuses.len() {
            return Err(GraphConfigError::CycleDetected {
                entity_type: self.entity_type,
            });
        }
        Ok(())
    }

    fn check_canonical_inbound(&self, initial: &StatusName) -> Result<(), GraphConfigError> {
        for status in &self.statuses {
            if status == initial {
                continue;
            }
            let count = self
                .edges
                .iter()
                .filter(|edge| edge.to() == status && edge.is_canonical())
                .count();
            if count == 0 {
                return Err(GraphConfigError::MissingCanonicalInbound {
                    entity_type: self.entity_type,
                    status: status.clone(),
                });
            }
            if count > 1 {
                return Err(GraphConfigError::DuplicateCanonicalInbound {
                    entity_type: self.entity_type,
                    status: status.clone(),
                });
            }
        }
        Ok(())
    }

    fn trace_happy_path(&self, initial: &StatusName) -> Result<Vec<StatusName>, GraphConfigError> {
        let mut path = vec![initial.clone()];
        let mut current = initial.clone();
        // Bounded by the status count; acyclicity is already established.
        for _ in 0..self.statuses.len() {
            let mut continuations = self.edges.iter().filter(|edge| {
                edge.from() == &current && edge.is_canonical() && edge.kind() == EdgeKind::Advance
            });
            let Some(next) = continuations.next() else {
                break;
            };
            if continuations.next().is_some() {
                return Err(GraphConfigError::AmbiguousHappyPath {
                    entity_type: self.entity_type,
                    status: current,
                });
            }
            current = next.to().clone();
            path.push(current.clone());
        }

        if !self.terminals.contains(&current) {
            return Err(GraphConfigError::HappyPathDeadEnd {
                entity_type: self.entity_type,
                status: current,
            });
        }
        Ok(path)
    }
}

/// Validated status graph for one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusGraph {
    entity_type: EntityType,
    initial: StatusName,
    statuses: Vec<StatusName>,
    terminals: BTreeSet<StatusName>,
    edges: Vec<TransitionEdge>,
    happy_path: Vec<StatusName>,
}

impl StatusGraph {
    /// Starts a builder for the entity type.
    #[must_use]
    pub const fn builder(entity_type: EntityType) -> StatusGraphBuilder {
        StatusGraphBuilder::new(entity_type)
    }

    /// Returns the entity type the graph governs.
    #[must_use]
    pub const fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Returns the initial status.
    #[must_use]
    pub const fn initial(&self) -> &StatusName {
        &self.initial
    }

    /// Returns all statuses in declaration order.
    #[must_use]
    pub fn statuses(&self) -> &[StatusName] {
        &self.statuses
    }

    /// Returns whether the status belongs to the graph.
    #[must_use]
    pub fn has_status(&self, status: &StatusName) -> bool {
        self.statuses.contains(status)
    }

    /// Returns whether the status is terminal.
    ///
    /// Unknown statuses are not terminal; callers flag them via
    /// [`StatusGraph::require_known`].
    #[must_use]
    pub fn is_terminal(&self, status: &StatusName) -> bool {
        self.terminals.contains(status)
    }

    /// Returns whether the status is a terminal reached through a failure
    /// edge (rejected, cancelled, disqualified).
    #[must_use]
    pub fn is_terminal_failure(&self, status: &StatusName) -> bool {
        self.is_terminal(status)
            && self
                .canonical_inbound(status)
                .is_some_and(|edge| edge.kind() == EdgeKind::Failure)
    }

    /// Returns the outgoing edges from a status.
    ///
    /// Empty for terminal and unknown statuses.
    pub fn outgoing(&self, status: &StatusName) -> impl Iterator<Item = &TransitionEdge> {
        self.edges.iter().filter(move |edge| edge.from() == status)
    }

    /// Returns the edge between two statuses, if one exists.
    #[must_use]
    pub fn edge(&self, from: &StatusName, to: &StatusName) -> Option<&TransitionEdge> {
        self.edges
            .iter()
            .find(|edge| edge.from() == from && edge.to() == to)
    }

    /// Returns the canonical inbound edge of a status, if any.
    #[must_use]
    pub fn canonical_inbound(&self, status: &StatusName) -> Option<&TransitionEdge> {
        self.edges
            .iter()
            .find(|edge| edge.to() == status && edge.is_canonical())
    }

    /// Returns the full happy path from the initial status to the success
    /// terminal.
    #[must_use]
    pub fn happy_path(&self) -> &[StatusName] {
        &self.happy_path
    }

    /// Checks that the status belongs to the graph.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::InvalidState`] for out-of-graph
    /// statuses.
    pub fn require_known(&self, status: &StatusName) -> Result<(), WorkflowDomainError> {
        if self.has_status(status) {
            return Ok(());
        }
        Err(WorkflowDomainError::InvalidState {
            entity_type: self.entity_type,
            status: status.clone(),
        })
    }

    /// Returns the canonical path from the initial status to `status`,
    /// resolving branches to the branch actually taken.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::InvalidState`] for out-of-graph
    /// statuses.
    pub fn canonical_path(&self, status: &StatusName) -> Result<Vec<StatusName>, WorkflowDomainError> {
        self.require_known(status)?;

        let mut reversed = vec![status.clone()];
        let mut cursor = status.clone();
        while cursor != self.initial {
            // Validation guarantees a canonical inbound edge for every
            // non-initial status; the fallback keeps the walk total.
            let Some(edge) = self.canonical_inbound(&cursor) else {
                break;
            };
            cursor = edge.from().clone();
            reversed.push(cursor.clone());
        }
        reversed.reverse();
        Ok(reversed)
    }
}

/// The validated graphs for all four entity types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowGraphs {
    requisition: StatusGraph,
    invoice: StatusGraph,
    vendor_registration: StatusGraph,
    tender_prequalification: StatusGraph,
}

impl WorkflowGraphs {
    /// Assembles the registry from one graph per entity type.
    ///
    /// # Errors
    ///
    /// Returns [`GraphConfigError::DuplicateGraph`] or
    /// [`GraphConfigError::MissingGraph`] when the set is not exactly one
    /// graph per entity type.
    pub fn new(graphs: impl IntoIterator<Item = StatusGraph>) -> Result<Self, GraphConfigError> {
        let mut by_type: BTreeMap<EntityType, StatusGraph> = BTreeMap::new();
        for graph in graphs {
            let entity_type = graph.entity_type();
            if by_type.insert(entity_type, graph).is_some() {
                return Err(GraphConfigError::DuplicateGraph { entity_type });
            }
        }

        let mut take = |entity_type| {
            by_type
                .remove(&entity_type)
                .ok_or(GraphConfigError::MissingGraph { entity_type })
        };

        Ok(Self {
            requisition: take(EntityType::Requisition)?,
            invoice: take(EntityType::Invoice)?,
            vendor_registration: take(EntityType::VendorRegistration)?,
            tender_prequalification: take(EntityType::TenderPrequalification)?,
        })
    }

    /// Returns the graph for an entity type.
    #[must_use]
    pub const fn graph(&self, entity_type: EntityType) -> &StatusGraph {
        match entity_type {
            EntityType::Requisition => &self.requisition,
            EntityType::Invoice => &self.invoice,
            EntityType::VendorRegistration => &self.vendor_registration,
            EntityType::TenderPrequalification => &self.tender_prequalification,
        }
    }

    /// Builds the builtin default graphs.
    ///
    /// These mirror the production lifecycles; deployments that tune the
    /// workflows load a definition file instead.
    ///
    /// # Errors
    ///
    /// Returns [`GraphConfigError`] if the builtin definitions ever fail
    /// their own validation; construction runs the same checks as loaded
    /// configuration.
    pub fn builtin() -> Result<Self, GraphConfigError> {
        Self::new([
            builtin_requisition()?,
            builtin_invoice()?,
            builtin_vendor_registration()?,
            builtin_tender_prequalification()?,
        ])
    }
}

fn status(name: &'static str) -> StatusName {
    StatusName::from_static(name)
}

fn builtin_requisition() -> Result<StatusGraph, GraphConfigError> {
    StatusGraph::builder(EntityType::Requisition)
        .initial(status("submitted"))
        .status(status("under_review"))
        .status(status("approved"))
        .terminal(status("delivered"))
        .terminal(status("rejected"))
        .terminal(status("cancelled"))
        .edge(
            TransitionEdge::new(
                status("submitted"),
                status("under_review"),
                Role::ProcurementOfficer,
            )
            .canonical(),
        )
        .edge(
            TransitionEdge::new(status("under_review"), status("approved"), Role::Approver)
                .canonical()
                .with_separation_of_duties(),
        )
        .edge(
            TransitionEdge::new(status("under_review"), status("rejected"), Role::Approver)
                .failure()
                .canonical()
                .with_separation_of_duties(),
        )
        .edge(
            TransitionEdge::new(
                status("approved"),
                status("delivered"),
                Role::ProcurementOfficer,
            )
            .canonical(),
        )
        .edge(
            TransitionEdge::new(status("submitted"), status("cancelled"), Role::Requester)
                .failure()
                .canonical(),
        )
        .build()
}

fn builtin_invoice() -> Result<StatusGraph, GraphConfigError> {
    StatusGraph::builder(EntityType::Invoice)
        .initial(status("pending"))
        .status(status("approved"))
        .terminal(status("paid"))
        .terminal(status("rejected"))
        .edge(
            TransitionEdge::new(status("pending"), status("approved"), Role::Finance)
                .canonical()
                .with_separation_of_duties(),
        )
        .edge(
            TransitionEdge::new(status("pending"), status("rejected"), Role::Finance)
                .failure()
                .canonical()
                .with_separation_of_duties(),
        )
        .edge(
            TransitionEdge::new(status("approved"), status("paid"), Role::Finance)
                .canonical()
                .with_rule(TransitionRule::AmountPositive),
        )
        .build()
}

fn builtin_vendor_registration() -> Result<StatusGraph, GraphConfigError> {
    StatusGraph::builder(EntityType::VendorRegistration)
        .initial(status("submitted"))
        .status(status("under_review"))
        .status(status("verified"))
        .terminal(status("approved"))
        .terminal(status("rejected"))
        .edge(
            TransitionEdge::new(
                status("submitted"),
                status("under_review"),
                Role::ProcurementOfficer,
            )
            .canonical(),
        )
        .edge(
            TransitionEdge::new(
                status("under_review"),
                status("verified"),
                Role::ProcurementOfficer,
            )
            .canonical(),
        )
        .edge(
            TransitionEdge::new(
                status("under_review"),
                status("rejected"),
                Role::ProcurementOfficer,
            )
            .failure()
            .canonical(),
        )
        .edge(
            TransitionEdge::new(status("verified"), status("approved"), Role::Admin)
                .canonical()
                .with_separation_of_duties(),
        )
        .build()
}

fn builtin_tender_prequalification() -> Result<StatusGraph, GraphConfigError> {
    StatusGraph::builder(EntityType::TenderPrequalification)
        .initial(status("published"))
        .status(status("evaluation"))
        .status(status("shortlisted"))
        .terminal(status("awarded"))
        .terminal(status("disqualified"))
        .edge(
            TransitionEdge::new(
                status("published"),
                status("evaluation"),
                Role::ProcurementOfficer,
            )
            .canonical(),
        )
        .edge(
            TransitionEdge::new(status("evaluation"), status("shortlisted"), Role::Approver)
                .canonical()
                .with_separation_of_duties(),
        )
        .edge(
            TransitionEdge::new(
                status("evaluation"),
                status("disqualified"),
                Role::ProcurementOfficer,
            )
            .failure()
            .canonical(),
        )
        .edge(
            TransitionEdge::new(status("shortlisted"), status("awarded"), Role::Approver)
                .canonical()
                .with_separation_of_duties(),
        )
        .build()
}
