//! In-memory store integration tests.
//!
//! Tests are organized into modules by functionality:
//! - `approval_flow_tests`: Full lifecycles through the dispatch service
//! - `dashboard_tests`: Metric aggregation over stored collections

mod in_memory {
    pub mod helpers;

    mod approval_flow_tests;
    mod dashboard_tests;
}
