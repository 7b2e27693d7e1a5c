//! Port contracts for external collaborators of the workflow core.

mod auth;
mod repository;

pub use auth::AuthContext;
pub use repository::{ItemFilter, WorkflowItemStore, WorkflowStoreError, WorkflowStoreResult};
