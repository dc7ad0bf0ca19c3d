//! Ownership checks gating post mutations.

use crate::domain::types::ActorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Only the owner of a resource may mutate it.
pub fn authorize_mutation(actor: ActorId, resource_owner: ActorId) -> Decision {
    if actor == resource_owner {
        Decision::Allow
    } else {
        Decision::Deny
    }
}
