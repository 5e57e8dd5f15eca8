//! Canonical data model primitives for Anchordesk closure anchoring.
//!
//! Every field that participates in hashing or ledger verification lives in
//! this crate: the closure payload, digest primitives, and the validated
//! identifier newtypes. Canonical bytes follow RFC 8785 (JCS), so two
//! logically equal payloads always hash identically regardless of how they
//! were constructed.
//!
#![deny(missing_docs)]

/// Canonicalization helpers for deterministic hashing.
pub mod canonicalizer;
/// Domain-separated content digest computation.
pub mod content;
/// Digest primitives.
pub mod digest;
/// Core identifiers and newtypes.
pub mod identifiers;
/// Closure payload data model.
pub mod payload;
/// Validation helpers used by canonical types.
pub mod validation;

pub use canonicalizer::{CanonicalizationError, Canonicalizer};
pub use content::{compute_content_digest, digest_bytes, DigestComputationError};
pub use digest::{Digest, DigestAlg};
pub use identifiers::{SubmitterId, TicketId, Timestamp, TxReference};
pub use payload::{
    compute_closure_digest, compute_entity_digest, ClosurePayload, CLOSURE_DOMAIN_SEPARATOR,
    ENTITY_DOMAIN_SEPARATOR,
};
pub use validation::ValidationError;
