//! Palladio: procurement lifecycle workflow core.
//!
//! This crate implements the decision layer of a procurement/HRMS system:
//! the status state machines for requisitions, invoices, vendor
//! registrations, and tender prequalifications, transition authorization,
//! audit-timeline reconstruction, and dashboard metric derivation. It is a
//! deterministic, synchronous library consumed by a persistence layer and
//! a UI/API layer; neither transport nor storage is defined here.
//!
//! # Architecture
//!
//! Palladio follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory store,
//!   configuration loading)
//!
//! # Modules
//!
//! - [`workflow`]: Status graphs, transition dispatch, timelines, metrics

pub mod workflow;
