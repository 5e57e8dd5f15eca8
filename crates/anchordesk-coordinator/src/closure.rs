//! Ticket closure records and the closure state machine.

use anchordesk_canonical::{ClosurePayload, Digest, TicketId, TxReference};
use anchordesk_journal::AnchorPath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a closure.
///
/// ```text
/// Resolving -> DirectSubmit  -> Anchored -> Closed
///           -> AnchorPending -> Anchored -> Closed
///                             \-> Rejected
/// ```
///
/// `Anchored` is momentary: a verified ledger record promotes the closure
/// to `Closed` in the same locked transition. `Closed` is final; a
/// `Rejected` closure may be superseded by a fresh resolution with a new
/// payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosureStatus {
    /// Payload frozen, digest computed, nothing submitted yet.
    Resolving,
    /// The coordinator is submitting under its own identity.
    DirectSubmit,
    /// Waiting for an externally signed anchor to be confirmed.
    AnchorPending,
    /// Ledger record verified present; promotion to `Closed` pending.
    Anchored,
    /// Closure recorded and audited; terminal.
    Closed,
    /// Closure failed with a recorded cause; terminal but supersedable.
    Rejected,
}

impl ClosureStatus {
    /// Whether no further transition can happen without a new resolution.
    pub fn is_terminal(self) -> bool {
        matches!(self, ClosureStatus::Closed | ClosureStatus::Rejected)
    }
}

/// Why a closure was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionCause {
    /// A claimed or recorded digest did not match the recomputed one.
    DigestMismatch,
    /// Pending anchor never appeared within the allowed window.
    AnchorTimeout,
    /// The ledger explicitly refused the submission.
    LedgerRejected(String),
    /// The submitting identity was not on the ledger allowlist.
    Unauthorized,
    /// Submission could not be delivered within the retry budget.
    SubmitFailed(String),
}

impl RejectionCause {
    /// Stable label written to the audit trail.
    pub fn label(&self) -> &'static str {
        match self {
            RejectionCause::DigestMismatch => "digest_mismatch",
            RejectionCause::AnchorTimeout => "anchor_timeout",
            RejectionCause::LedgerRejected(_) => "ledger_rejected",
            RejectionCause::Unauthorized => "unauthorized",
            RejectionCause::SubmitFailed(_) => "submit_failed",
        }
    }
}

impl std::fmt::Display for RejectionCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionCause::LedgerRejected(reason) | RejectionCause::SubmitFailed(reason) => {
                write!(f, "{}: {}", self.label(), reason)
            }
            _ => f.write_str(self.label()),
        }
    }
}

/// A closure in flight or settled.
///
/// The payload is frozen at resolution time; `digest` and `entity_digest`
/// are always recomputed from it, never taken from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketClosure {
    /// Ticket being closed.
    pub ticket_id: TicketId,
    /// Frozen resolution payload.
    pub payload: ClosurePayload,
    /// Digest committed to the ledger.
    pub digest: Digest,
    /// Entity digest grouping ledger records by ticket.
    pub entity_digest: Digest,
    /// Which anchoring path this closure takes.
    pub path: AnchorPath,
    /// Current state.
    pub status: ClosureStatus,
    /// Ledger transaction reference, known once anchored.
    pub tx_reference: Option<TxReference>,
    /// When the anchor was requested; drives sweeper age checks.
    pub anchor_requested_at: Option<DateTime<Utc>>,
    /// Populated when `status` is [`ClosureStatus::Rejected`].
    pub rejection: Option<RejectionCause>,
}

/// Proof of a completed closure, returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureReceipt {
    /// Ticket that was closed.
    pub ticket_id: TicketId,
    /// Digest the ledger holds for this closure.
    pub digest: Digest,
    /// Entity digest of the ticket.
    pub entity_digest: Digest,
    /// Transaction reference of the anchoring record. Present when the
    /// submission receipt or confirmation was observed; a closure settled
    /// purely by a verify lookup has none.
    pub tx_reference: Option<TxReference>,
    /// Path that anchored the closure.
    pub path: AnchorPath,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(ClosureStatus::Closed.is_terminal());
        assert!(ClosureStatus::Rejected.is_terminal());
        assert!(!ClosureStatus::Resolving.is_terminal());
        assert!(!ClosureStatus::DirectSubmit.is_terminal());
        assert!(!ClosureStatus::AnchorPending.is_terminal());
        assert!(!ClosureStatus::Anchored.is_terminal());
    }

    #[test]
    fn rejection_labels_are_stable() {
        assert_eq!(RejectionCause::DigestMismatch.label(), "digest_mismatch");
        assert_eq!(
            RejectionCause::LedgerRejected("dup".into()).to_string(),
            "ledger_rejected: dup"
        );
    }
}
