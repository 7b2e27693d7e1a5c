//! Step definitions for workflow transition BDD scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
