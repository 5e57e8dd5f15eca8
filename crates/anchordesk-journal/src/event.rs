//! Typed audit events with content-derived event ids.
//!
//! Event ids are computed as `sha256(domain_separator || canonical_bytes)`
//! with the `event_id` field excluded from the hash input, so a stored
//! event can always be re-verified against its own content.

use anchordesk_canonical::{
    compute_content_digest, Canonicalizer, Digest, DigestComputationError, SubmitterId, TicketId,
    Timestamp, TxReference,
};
use serde::{Deserialize, Serialize};

/// Domain separator for audit event ids.
pub const AUDIT_DOMAIN_SEPARATOR: &[u8] = b"anchordesk:audit:v1\0";

/// Which submission path produced the closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorPath {
    /// Backend submitted under its own authorized identity.
    Direct,
    /// A user-controlled wallet signed and submitted.
    Wallet,
}

/// Terminal outcome being audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    /// The ticket reached `Closed`.
    Closed,
    /// The closure was rejected.
    Rejected,
}

/// Body of an audit event: everything that participates in hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Ticket whose closure terminated.
    pub ticket_id: TicketId,
    /// Closure payload digest.
    pub digest: Digest,
    /// Entity digest grouping records by ticket.
    pub entity_digest: Digest,
    /// Submission path.
    pub path: AnchorPath,
    /// Terminal outcome.
    pub outcome: AuditOutcome,
    /// Rejection cause, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    /// Ledger transaction reference, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_reference: Option<TxReference>,
    /// Identity that drove the transition.
    pub submitter: SubmitterId,
    /// When the terminal transition happened.
    pub occurred_at: Timestamp,
}

/// A sealed audit event: body plus its content-derived id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Content-derived event id.
    pub event_id: Digest,
    /// Hashed body.
    #[serde(flatten)]
    pub record: AuditRecord,
}

impl AuditEvent {
    /// Seals a record by computing its event id.
    pub fn seal(
        record: AuditRecord,
        canonicalizer: &Canonicalizer,
    ) -> Result<Self, DigestComputationError> {
        let event_id = compute_audit_event_id(&record, canonicalizer)?;
        Ok(Self { event_id, record })
    }
}

/// Computes the event id for an audit record.
pub fn compute_audit_event_id(
    record: &AuditRecord,
    canonicalizer: &Canonicalizer,
) -> Result<Digest, DigestComputationError> {
    compute_content_digest(record, AUDIT_DOMAIN_SEPARATOR, canonicalizer)
}
