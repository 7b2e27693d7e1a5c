//! Procurement lifecycle management for Palladio.
//!
//! This module owns the rules governing how requisitions, invoices, vendor
//! registrations, and tender prequalifications move through their status
//! lifecycles: which transitions exist, who may trigger them, how the audit
//! timeline is reconstructed from sparse timestamps, and how dashboard
//! metrics are derived from item collections. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
