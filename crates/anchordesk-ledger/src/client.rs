use anchordesk_canonical::{Digest, SubmitterId};
use thiserror::Error;

use crate::record::{LedgerRecord, RecordAction, RecordReceipt};

/// Errors surfaced by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Submitter is not in the allowlist; the ledger state is unchanged,
    /// not even partially.
    #[error("submitter '{submitter}' is not authorized to write")]
    Unauthorized {
        /// Identity that was refused.
        submitter: String,
    },
    /// Transient transport failure; retryable with backoff.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
    /// Explicit refusal by the ledger; not retryable for the same digest.
    #[error("ledger rejected submission: {0}")]
    Rejected(String),
    /// The transport could not confirm the outcome (e.g. timeout waiting
    /// for inclusion). The submission may or may not have landed; callers
    /// must `verify` before concluding failure.
    #[error("submission outcome unknown: {0}")]
    Unknown(String),
}

impl LedgerError {
    /// Whether the error is transient and worth retrying as-is.
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::Unavailable(_))
    }
}

/// Abstraction over the external append-only store.
///
/// `submit` is idempotent at the ledger's semantic layer — a duplicate
/// digest never creates a second entry — but the underlying transport is
/// not: a resubmission after a timeout may or may not have landed. The
/// verify-then-decide discipline belongs to the caller.
pub trait LedgerClient: Send + Sync {
    /// Submits a record for the given digest.
    fn submit(
        &self,
        digest: &Digest,
        action: RecordAction,
        entity_digest: &Digest,
        submitter: &SubmitterId,
        metadata: &str,
    ) -> Result<RecordReceipt, LedgerError>;

    /// Looks up a record by digest. `None` means the digest was never
    /// accepted.
    fn verify(&self, digest: &Digest) -> Result<Option<LedgerRecord>, LedgerError>;

    /// Count of distinct digests ever accepted; monotonically non-decreasing.
    fn total_records(&self) -> Result<u64, LedgerError>;

    /// Whether the identity is currently in the submitter allowlist.
    fn is_authorized(&self, submitter: &SubmitterId) -> Result<bool, LedgerError>;
}
