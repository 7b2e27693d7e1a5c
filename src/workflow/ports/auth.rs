//! Authentication context port.

use crate::workflow::domain::{ActorContext, Role};

/// Supplies the identity and role of the actor behind the current request.
///
/// Implemented by the host application's session layer; the core never
/// inspects tokens or sessions itself.
pub trait AuthContext: Send + Sync {
    /// Returns the current actor's identity and role.
    fn current_actor(&self) -> ActorContext;

    /// Returns the current actor's role.
    fn current_role(&self) -> Role {
        self.current_actor().role()
    }
}
