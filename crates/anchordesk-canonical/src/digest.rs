use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Supported digest algorithms for canonical identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DigestAlg {
    /// SHA-256 (the only algorithm the ledger contract accepts).
    #[serde(rename = "sha-256")]
    Sha256,
}

/// Algorithm + 32-byte digest, encoded as base64url without padding.
///
/// The text form is exactly 43 characters; it doubles as the ledger's
/// primary key for a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest {
    /// Digest algorithm (currently always `sha-256`).
    pub alg: DigestAlg,
    /// Base64URL (no padding) digest bytes.
    #[serde(rename = "b64")]
    pub b64: String,
}

impl Digest {
    /// Constructs a validated digest from its text form.
    pub fn new(alg: DigestAlg, b64: impl Into<String>) -> Result<Self, ValidationError> {
        let b64 = b64.into();
        let re = Regex::new(r"^[A-Za-z0-9_-]{43}$").expect("invalid regex");
        if !re.is_match(&b64) {
            return Err(ValidationError::PatternMismatch {
                field: "digest",
                value: b64,
            });
        }
        Ok(Digest { alg, b64 })
    }

    /// Constructs a digest from raw 32-byte hash output.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        use base64::Engine;
        let b64 = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);
        Digest {
            alg: DigestAlg::Sha256,
            b64,
        }
    }

    /// Decodes the digest back to its raw 32 bytes.
    pub fn to_bytes(&self) -> Result<[u8; 32], ValidationError> {
        use base64::Engine;
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(&self.b64)
            .map_err(|_| ValidationError::PatternMismatch {
                field: "digest",
                value: self.b64.clone(),
            })?;
        decoded
            .try_into()
            .map_err(|_| ValidationError::PatternMismatch {
                field: "digest",
                value: self.b64.clone(),
            })
    }

    /// Renders the digest as a `0x`-prefixed hex string (wire form used by
    /// the external ledger contract).
    pub fn to_hex(&self) -> Result<String, ValidationError> {
        let bytes = self.to_bytes()?;
        let mut out = String::with_capacity(66);
        out.push_str("0x");
        for b in bytes {
            out.push_str(&format!("{:02x}", b));
        }
        Ok(out)
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.b64)
    }
}
