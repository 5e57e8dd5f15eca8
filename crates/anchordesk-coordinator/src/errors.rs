//! Coordinator error types.

use anchordesk_canonical::{Digest, DigestComputationError, TicketId, ValidationError};
use anchordesk_journal::TrailError;
use anchordesk_ledger::{LedgerError, NetworkId};
use thiserror::Error;

use crate::capability::Role;

/// Errors surfaced by coordinator operations.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Input failed validation before any digest was computed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Canonicalization or hashing of the payload failed.
    #[error(transparent)]
    Digest(#[from] DigestComputationError),

    /// The actor's role may not close tickets.
    #[error("role '{role}' may not close tickets")]
    CapabilityDenied {
        /// Role that was refused.
        role: Role,
    },

    /// The ticket already has a verified closure.
    #[error("ticket '{ticket_id}' is already closed")]
    AlreadyClosed {
        /// Ticket in question.
        ticket_id: TicketId,
    },

    /// A non-terminal closure already exists for the ticket.
    #[error("a closure for ticket '{ticket_id}' is already in flight")]
    ClosureInFlight {
        /// Ticket in question.
        ticket_id: TicketId,
    },

    /// The ticket's closure was rejected; a fresh resolution is required.
    #[error("closure for ticket '{ticket_id}' was rejected ({cause}); re-resolve to retry")]
    ClosureRejected {
        /// Ticket in question.
        ticket_id: TicketId,
        /// Recorded rejection cause.
        cause: String,
    },

    /// No closure is known for the ticket.
    #[error("no closure in flight for ticket '{ticket_id}'")]
    UnknownTicket {
        /// Ticket in question.
        ticket_id: TicketId,
    },

    /// A confirmation arrived from the wrong network.
    #[error("confirmation bound to network {actual}, expected {expected}")]
    NetworkMismatch {
        /// Network the coordinator anchors to.
        expected: NetworkId,
        /// Network the confirmation claimed.
        actual: NetworkId,
    },

    /// A claimed digest did not match the digest recomputed from the
    /// stored payload. The closure is rejected and never auto-retried.
    #[error("digest mismatch: recomputed {expected}, claimed {claimed}")]
    DigestMismatch {
        /// Digest recomputed from the frozen payload.
        expected: Digest,
        /// Digest the caller or ledger presented.
        claimed: Digest,
    },

    /// Submission outcome could not be determined within the retry
    /// budget; the closure is parked for the sweeper.
    #[error("anchor outcome unknown for ticket '{ticket_id}'; parked for reconciliation")]
    AnchorOutcomeUnknown {
        /// Ticket in question.
        ticket_id: TicketId,
    },

    /// Ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Audit trail append failed.
    #[error(transparent)]
    Audit(#[from] TrailError),
}
