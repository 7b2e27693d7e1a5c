//! Aggregate dashboard metrics over collections of workflow items.

use super::{Amount, EntityType, StateMachine, StatusGraph, StatusName, WorkflowItem};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Derived metrics for one entity type. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowMetrics {
    /// Item tally per status, including zero-count statuses.
    pub counts_by_status: BTreeMap<StatusName, u64>,
    /// Sum of the type's designated amount field over all items.
    pub total_amount: Amount,
    /// Non-terminal items whose due date has elapsed.
    pub overdue_count: u64,
    /// Spent budget over allocated budget, clamped to `[0, 100]`.
    /// Zero when nothing is allocated, never a division error.
    pub utilization_percent: u8,
    /// Mean days since creation over non-terminal items; zero when there
    /// are none.
    pub average_processing_days: u64,
    /// Items whose status is outside the graph. These are flagged rather
    /// than silently coerced, and excluded from overdue and
    /// average-processing derivations.
    pub invalid_state_count: u64,
}

impl WorkflowMetrics {
    /// Creates a zeroed metrics value seeded with every status the graph
    /// declares.
    #[must_use]
    pub fn zeroed(graph: &StatusGraph) -> Self {
        Self {
            counts_by_status: graph
                .statuses()
                .iter()
                .map(|status| (status.clone(), 0))
                .collect(),
            ..Self::default()
        }
    }
}

/// Computes [`WorkflowMetrics`] over item collections.
///
/// Pure and synchronous; `now` is threaded in explicitly so derivations
/// are deterministic and testable.
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    machine: Arc<StateMachine>,
}

impl MetricsAggregator {
    /// Creates an aggregator over the state machine.
    #[must_use]
    pub const fn new(machine: Arc<StateMachine>) -> Self {
        Self { machine }
    }

    /// Aggregates metrics for `entity_type` over `items` as of `now`.
    ///
    /// Items of a different entity type are ignored. An empty collection
    /// yields a fully zeroed metrics value.
    #[must_use]
    pub fn aggregate(
        &self,
        entity_type: EntityType,
        items: &[WorkflowItem],
        now: DateTime<Utc>,
    ) -> WorkflowMetrics {
        let graph = self.machine.graph(entity_type);
        let mut metrics = WorkflowMetrics::zeroed(graph);
        let mut allocated_total = 0_u64;
        let mut spent_total = 0_u64;
        let mut processing_days_total = 0_u64;
        let mut open_count = 0_u64;

        for item in items.iter().filter(|item| item.entity_type() == entity_type) {
            metrics.total_amount = metrics.total_amount.saturating_add(item.amount());

            if !graph.has_status(item.status()) {
                metrics.invalid_state_count = metrics.invalid_state_count.saturating_add(1);
                continue;
            }

            if let Some(count) = metrics.counts_by_status.get_mut(item.status()) {
                *count = count.saturating_add(1);
            }

            if let Some(allocated) = item.allocated() {
                allocated_total = allocated_total.saturating_add(allocated.minor_units());
            }
            // Rejected and cancelled work does not consume budget.
            if !graph.is_terminal_failure(item.status()) {
                spent_total = spent_total.saturating_add(item.amount().minor_units());
            }

            if !graph.is_terminal(item.status()) {
                if item.due_elapsed(now) {
                    metrics.overdue_count = metrics.overdue_count.saturating_add(1);
                }
                processing_days_total =
                    processing_days_total.saturating_add(days_since(item.created_at(), now));
                open_count = open_count.saturating_add(1);
            }
        }

        metrics.utilization_percent = utilization_percent(spent_total, allocated_total);
        metrics.average_processing_days = processing_days_total
            .checked_div(open_count)
            .unwrap_or(0);
        metrics
    }
}

/// Whole days elapsed between `from` and `now`, floored at zero.
fn days_since(from: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from((now - from).num_days().max(0)).unwrap_or(0)
}

/// Spent over allocated as an integer percentage clamped to `[0, 100]`.
/// Zero allocation yields zero.
fn utilization_percent(spent: u64, allocated: u64) -> u8 {
    if allocated == 0 {
        return 0;
    }
    let scaled = u128::from(spent).saturating_mul(100);
    let percent = scaled.checked_div(u128::from(allocated)).unwrap_or(0);
    u8::try_from(percent.min(100)).unwrap_or(100)
}
