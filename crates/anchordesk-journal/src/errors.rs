use thiserror::Error;

/// Errors raised while writing or reading the audit trail.
#[derive(Error, Debug)]
pub enum TrailError {
    /// Underlying file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The file does not start with a valid trail preamble.
    #[error("not an audit trail: {0}")]
    NotATrail(String),
    /// The file ends inside a frame. Recoverable: the complete frames
    /// before the tear are intact.
    #[error("trail truncated inside the frame at offset {offset}")]
    TruncatedFrame {
        /// Offset of the torn frame's head.
        offset: u64,
    },
    /// A frame's content does not match its stored seal. Not recoverable:
    /// bytes were rewritten after the append.
    #[error("frame seal mismatch at offset {offset}; trail bytes were altered")]
    SealMismatch {
        /// Offset of the altered frame's head.
        offset: u64,
    },
    /// A frame claims a payload larger than the format allows.
    #[error("frame payload of {len} bytes exceeds the {max} byte limit")]
    OversizedFrame {
        /// Claimed payload length.
        len: u32,
        /// Format limit.
        max: u32,
    },
    /// An event payload is not valid UTF-8.
    #[error("invalid UTF-8 in event payload: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    /// An event payload is not valid JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    /// Event id computation failed.
    #[error("event id computation failed: {0}")]
    EventId(#[from] anchordesk_canonical::DigestComputationError),
}
