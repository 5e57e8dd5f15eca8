//! Closure payload: the unit of content that gets anchored to the ledger.

use crate::content::{compute_content_digest, digest_bytes, DigestComputationError};
use crate::{Canonicalizer, Digest, TicketId, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};

/// Domain separator for closure payload digests.
pub const CLOSURE_DOMAIN_SEPARATOR: &[u8] = b"anchordesk:closure:v1\0";

/// Domain separator for entity digests derived from ticket identifiers.
pub const ENTITY_DOMAIN_SEPARATOR: &[u8] = b"anchordesk:entity:v1\0";

/// Immutable record of a ticket resolution, frozen at digest time.
///
/// The payload is the only content the ledger ever commits to; `closed_at`
/// is fixed when the operator resolves the ticket, so a re-resolution always
/// produces a new payload and therefore a new digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosurePayload {
    /// Ticket being closed.
    pub ticket_id: TicketId,
    /// Operator-supplied resolution text.
    pub resolution_text: String,
    /// When the resolution was produced (frozen; never regenerated).
    pub closed_at: Timestamp,
}

impl ClosurePayload {
    /// Builds a validated payload.
    ///
    /// Fails with [`ValidationError`] before any canonicalization is
    /// attempted: blank resolution text, a malformed ticket id, or a
    /// malformed timestamp never produce a digest.
    pub fn new(
        ticket_id: impl Into<String>,
        resolution_text: impl Into<String>,
        closed_at: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let ticket_id = TicketId::parse(ticket_id)?;
        let resolution_text = resolution_text.into();
        if resolution_text.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "resolution_text",
            });
        }
        let closed_at = Timestamp::parse(closed_at)?;
        Ok(Self {
            ticket_id,
            resolution_text,
            closed_at,
        })
    }
}

/// Computes the ledger digest for a closure payload.
pub fn compute_closure_digest(
    payload: &ClosurePayload,
    canonicalizer: &Canonicalizer,
) -> Result<Digest, DigestComputationError> {
    compute_content_digest(payload, CLOSURE_DOMAIN_SEPARATOR, canonicalizer)
}

/// Computes the entity digest that groups ledger records by ticket.
pub fn compute_entity_digest(ticket_id: &TicketId) -> Digest {
    digest_bytes(ENTITY_DOMAIN_SEPARATOR, ticket_id.as_ref().as_bytes())
}
