//! Orchestration services for the workflow core.

mod dispatch;

pub use dispatch::{
    ActionDispatchError, ActionDispatchResult, ActionDispatchService, SubmitItemRequest,
};
