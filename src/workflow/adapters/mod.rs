//! Adapter implementations of the workflow ports.

pub mod fs;
pub mod memory;

pub use fs::{LoadedWorkflowConfig, WorkflowConfigError};
pub use memory::{InMemoryWorkflowItemStore, StaticAuthContext};
