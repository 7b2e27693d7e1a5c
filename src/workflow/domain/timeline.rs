//! Audit-timeline reconstruction from sparse timestamps.
//!
//! Workflow items persist only `created_at` and `updated_at`; the timeline
//! shown on detail pages is derived on demand from the canonical path,
//! a tunable per-type, per-status day-offset table, and description
//! templates. Identical inputs always produce identical output.

use super::{EntityType, GraphConfigError, StateMachine, StatusName, TimelineError};
use chrono::{DateTime, TimeDelta, Utc};
use minijinja::Environment;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One reconstructed audit-trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineStep {
    /// Status the step represents.
    pub status: StatusName,
    /// Actual timestamp for the final step, synthetic for prior steps.
    pub timestamp: DateTime<Utc>,
    /// Rendered human-readable description.
    pub description: String,
    /// Whether the lifecycle has passed this step.
    pub completed: bool,
    /// Whether this is the step the item currently sits at. Exactly one
    /// step is current for a non-terminal item, none for a terminal one.
    pub current: bool,
    /// Whether this step is a terminal failure outcome.
    pub terminal_failure: bool,
}

/// Per-type, per-status day offsets for synthetic step timestamps.
///
/// The offsets are data, not business logic: deployments tune them in the
/// workflow definition file without touching the reconstruction algorithm.
/// Statuses without an entry fall back to their position along the path,
/// one day per step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepSchedule {
    offsets: BTreeMap<EntityType, BTreeMap<StatusName, u32>>,
}

impl StepSchedule {
    /// Creates an empty schedule; every status falls back to its path
    /// position.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            offsets: BTreeMap::new(),
        }
    }

    /// Sets the day offset for a status.
    #[must_use]
    pub fn with_offset(mut self, entity_type: EntityType, status: StatusName, days: u32) -> Self {
        self.offsets
            .entry(entity_type)
            .or_default()
            .insert(status, days);
        self
    }

    /// Returns the configured day offset for a status, if any.
    #[must_use]
    pub fn offset_days(&self, entity_type: EntityType, status: &StatusName) -> Option<u32> {
        self.offsets
            .get(&entity_type)
            .and_then(|by_status| by_status.get(status))
            .copied()
    }

    /// Builds the builtin schedule.
    ///
    /// The day values are the original system's placeholder durations, not
    /// confirmed SLAs; deployments override them in configuration once the
    /// business owner settles the real figures.
    #[must_use]
    pub fn builtin() -> Self {
        let entries: [(EntityType, &str, u32); 18] = [
            (EntityType::Requisition, "submitted", 0),
            (EntityType::Requisition, "under_review", 1),
            (EntityType::Requisition, "approved", 3),
            (EntityType::Requisition, "rejected", 3),
            (EntityType::Requisition, "cancelled", 1),
            (EntityType::Requisition, "delivered", 5),
            (EntityType::Invoice, "pending", 0),
            (EntityType::Invoice, "approved", 1),
            (EntityType::Invoice, "paid", 2),
            (EntityType::Invoice, "rejected", 1),
            (EntityType::VendorRegistration, "submitted", 0),
            (EntityType::VendorRegistration, "under_review", 1),
            (EntityType::VendorRegistration, "verified", 2),
            (EntityType::VendorRegistration, "approved", 3),
            (EntityType::VendorRegistration, "rejected", 2),
            (EntityType::TenderPrequalification, "published", 0),
            (EntityType::TenderPrequalification, "evaluation", 2),
            (EntityType::TenderPrequalification, "shortlisted", 4),
        ];

        let mut schedule = Self::empty();
        for (entity_type, status, days) in entries {
            schedule = schedule.with_offset(entity_type, StatusName::from_static(status), days);
        }
        schedule
    }
}

/// Per-type, per-status MiniJinja description templates.
///
/// Templates render with `entity_type` and `status` in scope; statuses
/// without a template fall back to a humanized form of the status name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepDescriptions {
    templates: BTreeMap<EntityType, BTreeMap<StatusName, String>>,
}

impl StepDescriptions {
    /// Creates an empty description table.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }

    /// Sets the template for a status.
    #[must_use]
    pub fn with_template(
        mut self,
        entity_type: EntityType,
        status: StatusName,
        template: impl Into<String>,
    ) -> Self {
        self.templates
            .entry(entity_type)
            .or_default()
            .insert(status, template.into());
        self
    }

    /// Returns the template source for a status, if configured.
    #[must_use]
    pub fn template(&self, entity_type: EntityType, status: &StatusName) -> Option<&str> {
        self.templates
            .get(&entity_type)
            .and_then(|by_status| by_status.get(status))
            .map(String::as_str)
    }

    /// Builds the builtin description table.
    #[must_use]
    pub fn builtin() -> Self {
        let entries: [(EntityType, &str, &str); 19] = [
            (
                EntityType::Requisition,
                "submitted",
                "Requisition raised and submitted for review",
            ),
            (
                EntityType::Requisition,
                "under_review",
                "Under review by the approving manager",
            ),
            (
                EntityType::Requisition,
                "approved",
                "Approved and with procurement for fulfilment",
            ),
            (
                EntityType::Requisition,
                "delivered",
                "Goods or services delivered",
            ),
            (
                EntityType::Requisition,
                "rejected",
                "Rejected by the approving manager",
            ),
            (
                EntityType::Requisition,
                "cancelled",
                "Cancelled by the requester",
            ),
            (
                EntityType::Invoice,
                "pending",
                "Invoice received and awaiting finance review",
            ),
            (EntityType::Invoice, "approved", "Approved for payment"),
            (EntityType::Invoice, "paid", "Payment released"),
            (EntityType::Invoice, "rejected", "Rejected by finance"),
            (
                EntityType::VendorRegistration,
                "submitted",
                "Registration submitted",
            ),
            (
                EntityType::VendorRegistration,
                "under_review",
                "Submitted documents under review",
            ),
            (
                EntityType::VendorRegistration,
                "verified",
                "Compliance checks passed",
            ),
            (
                EntityType::VendorRegistration,
                "approved",
                "Vendor account activated",
            ),
            (
                EntityType::TenderPrequalification,
                "published",
                "Tender published to registered vendors",
            ),
            (
                EntityType::TenderPrequalification,
                "evaluation",
                "Submissions under evaluation",
            ),
            (
                EntityType::TenderPrequalification,
                "shortlisted",
                "Shortlisted for award",
            ),
            (EntityType::TenderPrequalification, "awarded", "Tender awarded"),
            (
                EntityType::TenderPrequalification,
                "disqualified",
                "Disqualified during evaluation",
            ),
        ];

        let mut descriptions = Self::empty();
        for (entity_type, status_name, template) in entries {
            descriptions = descriptions.with_template(
                entity_type,
                StatusName::from_static(status_name),
                template,
            );
        }
        descriptions
    }
}

/// Derives ordered, human-readable audit trails from an item's sparse
/// timestamps and current status.
#[derive(Debug, Clone)]
pub struct TimelineReconstructor {
    machine: Arc<StateMachine>,
    schedule: StepSchedule,
    descriptions: StepDescriptions,
}

impl TimelineReconstructor {
    /// Creates a reconstructor, validating every configured description
    /// template against the graphs.
    ///
    /// # Errors
    ///
    /// Returns [`GraphConfigError::InvalidTemplate`] when a template fails
    /// to render; template errors are configuration errors and must not
    /// surface at request time.
    pub fn new(
        machine: Arc<StateMachine>,
        schedule: StepSchedule,
        descriptions: StepDescriptions,
    ) -> Result<Self, GraphConfigError> {
        for entity_type in EntityType::ALL {
            for status_name in machine.graph(entity_type).statuses() {
                if descriptions.template(entity_type, status_name).is_some() {
                    render_description(&descriptions, entity_type, status_name).map_err(
                        |error| GraphConfigError::InvalidTemplate {
                            entity_type,
                            status: status_name.clone(),
                            reason: error.to_string(),
                        },
                    )?;
                }
            }
        }

        Ok(Self {
            machine,
            schedule,
            descriptions,
        })
    }

    /// Creates a reconstructor with the builtin schedule and descriptions.
    ///
    /// # Errors
    ///
    /// Returns [`GraphConfigError`] if the builtin templates fail
    /// validation.
    pub fn builtin(machine: Arc<StateMachine>) -> Result<Self, GraphConfigError> {
        Self::new(machine, StepSchedule::builtin(), StepDescriptions::builtin())
    }

    /// Reconstructs the audit trail for an item.
    ///
    /// The final step carries `updated_at` as its timestamp; earlier steps
    /// carry synthetic timestamps from the offset table. A non-terminal
    /// final step is `current`; a terminal one is `completed`, and flagged
    /// as a failure when it was reached through a failure edge. Nothing is
    /// synthesized past a failure.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError`] for an out-of-graph status or a template
    /// rendering failure.
    pub fn reconstruct(
        &self,
        entity_type: EntityType,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        status: &StatusName,
    ) -> Result<Vec<TimelineStep>, TimelineError> {
        let path = self.machine.canonical_path(entity_type, status)?;
        let terminal = self.machine.is_terminal(entity_type, status);
        let failure = self.machine.is_terminal_failure(entity_type, status);
        let last_index = path.len().saturating_sub(1);

        path.iter()
            .enumerate()
            .map(|(position, step_status)| {
                let is_last = position == last_index;
                let timestamp = if is_last {
                    updated_at
                } else {
                    self.synthetic_timestamp(entity_type, step_status, created_at, position)
                };
                Ok(TimelineStep {
                    status: step_status.clone(),
                    timestamp,
                    description: self.describe(entity_type, step_status)?,
                    completed: !is_last || terminal,
                    current: is_last && !terminal,
                    terminal_failure: is_last && failure,
                })
            })
            .collect()
    }

    /// Builds the full happy-path template timeline for an entity that does
    /// not exist yet (for example an unregistered vendor): no step is
    /// completed, the first step is `current`, and all timestamps are
    /// synthetic relative to `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::Template`] when a description fails to
    /// render.
    pub fn template(
        &self,
        entity_type: EntityType,
        reference: DateTime<Utc>,
    ) -> Result<Vec<TimelineStep>, TimelineError> {
        self.machine
            .happy_path(entity_type)
            .iter()
            .enumerate()
            .map(|(position, step_status)| {
                Ok(TimelineStep {
                    status: step_status.clone(),
                    timestamp: self
                        .synthetic_timestamp(entity_type, step_status, reference, position),
                    description: self.describe(entity_type, step_status)?,
                    completed: false,
                    current: position == 0,
                    terminal_failure: false,
                })
            })
            .collect()
    }

    fn synthetic_timestamp(
        &self,
        entity_type: EntityType,
        status: &StatusName,
        base: DateTime<Utc>,
        position: usize,
    ) -> DateTime<Utc> {
        let days = self
            .schedule
            .offset_days(entity_type, status)
            .unwrap_or_else(|| u32::try_from(position).unwrap_or(u32::MAX));
        base + TimeDelta::try_days(i64::from(days)).unwrap_or_default()
    }

    fn describe(
        &self,
        entity_type: EntityType,
        status: &StatusName,
    ) -> Result<String, TimelineError> {
        render_description(&self.descriptions, entity_type, status).map_err(|error| {
            TimelineError::Template {
                entity_type,
                status: status.clone(),
                reason: error.to_string(),
            }
        })
    }
}

fn render_description(
    descriptions: &StepDescriptions,
    entity_type: EntityType,
    status: &StatusName,
) -> Result<String, minijinja::Error> {
    let Some(source) = descriptions.template(entity_type, status) else {
        return Ok(humanize(status));
    };
    let environment = Environment::new();
    environment.render_str(source, build_template_context(entity_type, status))
}

fn build_template_context(entity_type: EntityType, status: &StatusName) -> Map<String, Value> {
    let mut context = Map::new();
    context.insert(
        "entity_type".to_owned(),
        Value::String(entity_type.as_str().to_owned()),
    );
    context.insert(
        "status".to_owned(),
        Value::String(status.as_str().to_owned()),
    );
    context
}

/// Title-cases a status name for statuses without a configured template.
fn humanize(status: &StatusName) -> String {
    status
        .as_str()
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
