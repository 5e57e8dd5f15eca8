use anchordesk_canonical::{Digest, SubmitterId, TxReference};
use serde::{Deserialize, Serialize};

/// Action recorded alongside a digest (`uint8` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordAction {
    /// Entity was created.
    Create,
    /// Entity was updated.
    Update,
    /// Entity was closed; the action used for ticket closures.
    Close,
    /// Anything else.
    Other,
}

impl RecordAction {
    /// Wire encoding used by the external contract.
    pub fn to_byte(self) -> u8 {
        match self {
            RecordAction::Create => 0,
            RecordAction::Update => 1,
            RecordAction::Close => 2,
            RecordAction::Other => 3,
        }
    }

    /// Decodes a wire byte; unrecognized values map to `Other`.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => RecordAction::Create,
            1 => RecordAction::Update,
            2 => RecordAction::Close,
            _ => RecordAction::Other,
        }
    }
}

/// A record as stored by the ledger. Immutable after insertion.
///
/// The ledger is the sole source of truth for "did this digest get
/// recorded"; a digest, once present, is never overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Primary key: digest of the anchored content.
    pub digest: Digest,
    /// Recorded action.
    pub action: RecordAction,
    /// Digest grouping records by subject entity.
    pub entity_digest: Digest,
    /// Identity that submitted the record.
    pub submitter: SubmitterId,
    /// External sequence number assigned at acceptance.
    pub sequence: u64,
    /// Opaque metadata string.
    pub metadata: String,
}

/// Receipt returned by a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordReceipt {
    /// Digest that was (or already had been) recorded.
    pub digest: Digest,
    /// Transaction reference for audit.
    pub tx_reference: TxReference,
    /// Sequence number of the accepted record.
    pub sequence: u64,
}
