//! Domain-separated content digest computation.
//!
//! Content digests are computed as `sha256(domain_separator || canonical_bytes)`
//! so that digests of different record kinds can never collide with each
//! other even when the underlying payloads are byte-identical.

use crate::{Canonicalizer, Digest};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest as Sha2Digest, Sha256};

/// Error during content digest computation.
#[derive(thiserror::Error, Debug)]
pub enum DigestComputationError {
    /// Serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(String),
    /// Canonicalization failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] crate::CanonicalizationError),
}

/// Hashes raw bytes under a domain separator.
pub fn digest_bytes(domain: &[u8], bytes: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(bytes);
    Digest::from_bytes(hasher.finalize().into())
}

/// Computes the domain-separated digest of a serializable value.
///
/// The value is serialized to JSON, canonicalized per RFC 8785, and hashed
/// as `sha256(domain || canonical_bytes)`. Deterministic: equal values
/// always produce the same digest regardless of field construction order.
pub fn compute_content_digest<T: Serialize>(
    value: &T,
    domain: &[u8],
    canonicalizer: &Canonicalizer,
) -> Result<Digest, DigestComputationError> {
    let value: Value = serde_json::to_value(value)
        .map_err(|e| DigestComputationError::Serialization(e.to_string()))?;
    let bytes = canonicalizer.canonicalize(&value)?;
    Ok(digest_bytes(domain, &bytes))
}
