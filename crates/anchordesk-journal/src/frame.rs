//! On-disk layout of the audit trail.
//!
//! A trail file is an 8-byte preamble followed by sealed frames. Each
//! frame head carries a truncated SHA-256 seal over its kind, length, and
//! payload, so a reader detects in-place edits without parsing the JSON
//! inside. A torn tail (crash mid-append) shortens the file and is
//! recoverable; a bad seal means bytes were rewritten and never is.
//!
//! ```text
//! preamble:  magic "ADTL" | version u16 LE | 2 zero bytes
//! frame:     kind u8 | payload len u32 LE | seal [u8; 8] | payload
//! ```

use sha2::{Digest, Sha256};

use crate::errors::TrailError;

/// Trail preamble magic.
pub const MAGIC: [u8; 4] = *b"ADTL";

/// On-disk format version.
pub const FORMAT_VERSION: u16 = 1;

/// Preamble length in bytes.
pub const PREAMBLE_LEN: usize = 8;

/// Frame head length in bytes: kind, payload length, seal.
pub const FRAME_HEAD_LEN: usize = 13;

/// Upper bound on a frame payload. Audit events are a few hundred bytes;
/// anything near this limit indicates corruption.
pub const MAX_PAYLOAD_LEN: u32 = 1024 * 1024;

/// Byte tag for frames carrying an audit event as JSON.
pub const FRAME_KIND_EVENT: u8 = 0x01;

/// Domain separator mixed into every frame seal.
pub const FRAME_SEAL_DOMAIN: &[u8] = b"anchordesk:frame:v1\0";

/// Encodes the file preamble.
pub fn encode_preamble() -> [u8; PREAMBLE_LEN] {
    let mut bytes = [0u8; PREAMBLE_LEN];
    bytes[0..4].copy_from_slice(&MAGIC);
    bytes[4..6].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes
}

/// Validates a file preamble.
pub fn decode_preamble(bytes: &[u8]) -> Result<(), TrailError> {
    if bytes.len() < PREAMBLE_LEN {
        return Err(TrailError::NotATrail(format!(
            "{} bytes is shorter than the preamble",
            bytes.len()
        )));
    }
    if bytes[0..4] != MAGIC {
        return Err(TrailError::NotATrail(format!(
            "bad magic {:?}",
            &bytes[0..4]
        )));
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != FORMAT_VERSION {
        return Err(TrailError::NotATrail(format!(
            "unsupported format version {}",
            version
        )));
    }
    if bytes[6..8] != [0, 0] {
        return Err(TrailError::NotATrail("non-zero preamble padding".into()));
    }
    Ok(())
}

/// What a frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// An audit event serialized as a UTF-8 JSON object.
    Event,
    /// A kind this version does not understand; preserved, not parsed.
    Unknown(u8),
}

impl FrameKind {
    /// Maps a byte tag to a kind.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            FRAME_KIND_EVENT => FrameKind::Event,
            other => FrameKind::Unknown(other),
        }
    }

    /// Byte tag for this kind.
    pub fn to_byte(self) -> u8 {
        match self {
            FrameKind::Event => FRAME_KIND_EVENT,
            FrameKind::Unknown(byte) => byte,
        }
    }
}

/// Truncated content seal stored in each frame head.
///
/// Eight bytes of `sha256(domain || kind || len || payload)`. Enough to
/// catch any in-place edit; collision resistance is not needed here, the
/// ledger digest carries that burden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSeal([u8; 8]);

impl FrameSeal {
    /// Computes the seal for a frame's kind and payload.
    pub fn compute(kind: FrameKind, payload: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(FRAME_SEAL_DOMAIN);
        hasher.update([kind.to_byte()]);
        hasher.update((payload.len() as u32).to_le_bytes());
        hasher.update(payload);
        let full = hasher.finalize();
        let mut seal = [0u8; 8];
        seal.copy_from_slice(&full[..8]);
        Self(seal)
    }

    /// Seal from its stored byte form.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Stored byte form.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Whether this seal matches the given frame content.
    pub fn covers(&self, kind: FrameKind, payload: &[u8]) -> bool {
        *self == Self::compute(kind, payload)
    }
}

/// Decoded frame head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHead {
    /// What the payload is.
    pub kind: FrameKind,
    /// Payload length in bytes.
    pub len: u32,
    /// Seal over kind, length, and payload.
    pub seal: FrameSeal,
}

impl FrameHead {
    /// Builds the head for a payload about to be written.
    pub fn for_payload(kind: FrameKind, payload: &[u8]) -> Result<Self, TrailError> {
        let len = payload.len() as u32;
        if payload.len() > MAX_PAYLOAD_LEN as usize {
            return Err(TrailError::OversizedFrame {
                len,
                max: MAX_PAYLOAD_LEN,
            });
        }
        Ok(Self {
            kind,
            len,
            seal: FrameSeal::compute(kind, payload),
        })
    }

    /// Serializes the head.
    pub fn encode(&self) -> [u8; FRAME_HEAD_LEN] {
        let mut bytes = [0u8; FRAME_HEAD_LEN];
        bytes[0] = self.kind.to_byte();
        bytes[1..5].copy_from_slice(&self.len.to_le_bytes());
        bytes[5..13].copy_from_slice(self.seal.as_bytes());
        bytes
    }

    /// Deserializes a head read from disk.
    pub fn decode(bytes: &[u8; FRAME_HEAD_LEN]) -> Result<Self, TrailError> {
        let kind = FrameKind::from_byte(bytes[0]);
        let len = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        if len > MAX_PAYLOAD_LEN {
            return Err(TrailError::OversizedFrame {
                len,
                max: MAX_PAYLOAD_LEN,
            });
        }
        let mut seal = [0u8; 8];
        seal.copy_from_slice(&bytes[5..13]);
        Ok(Self {
            kind,
            len,
            seal: FrameSeal::from_bytes(seal),
        })
    }
}
