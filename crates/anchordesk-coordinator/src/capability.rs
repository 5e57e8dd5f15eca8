//! Role-based capability checks.
//!
//! Closure is a privileged operation: only support-desk roles may resolve
//! and anchor a ticket. The check happens before any payload is built so a
//! denied actor never produces a digest or touches the ledger.

use anchordesk_canonical::SubmitterId;
use serde::{Deserialize, Serialize};

/// Organizational role of an actor interacting with the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Teaching staff; may open tickets, never close them.
    Staff,
    /// Administrative staff; may open tickets, never close them.
    Admin,
    /// IT support; handles and closes tickets.
    ItSupport,
    /// IT lead; handles and closes tickets, manages the support queue.
    ItLead,
    /// Director; read-only oversight.
    Director,
}

impl Role {
    /// Whether the role may resolve and close tickets.
    pub fn can_close_tickets(self) -> bool {
        matches!(self, Role::ItSupport | Role::ItLead)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Staff => "staff",
            Role::Admin => "admin",
            Role::ItSupport => "it_support",
            Role::ItLead => "it_lead",
            Role::Director => "director",
        };
        f.write_str(name)
    }
}

/// An authenticated actor: identity plus role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Submitter identity used for attribution.
    pub id: SubmitterId,
    /// Role driving capability checks.
    pub role: Role,
}

impl Actor {
    /// Builds an actor from its parts.
    pub fn new(id: SubmitterId, role: Role) -> Self {
        Self { id, role }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_support_roles_close_tickets() {
        assert!(Role::ItSupport.can_close_tickets());
        assert!(Role::ItLead.can_close_tickets());
        assert!(!Role::Staff.can_close_tickets());
        assert!(!Role::Admin.can_close_tickets());
        assert!(!Role::Director.can_close_tickets());
    }
}
