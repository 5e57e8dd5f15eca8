//! Verification helpers for trail events.

use crate::errors::TrailError;
use crate::event::{compute_audit_event_id, AuditEvent};
use anchordesk_canonical::Canonicalizer;

/// Verifies a stored audit event against its claimed event id.
///
/// Recomputes the id from the event body; a mismatch means the stored
/// entry was altered after it was sealed.
pub fn verify_event_id(
    event: &AuditEvent,
    canonicalizer: &Canonicalizer,
) -> Result<bool, TrailError> {
    let computed = compute_audit_event_id(&event.record, canonicalizer)?;
    Ok(event.event_id == computed)
}
