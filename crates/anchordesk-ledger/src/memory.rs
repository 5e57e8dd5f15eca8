//! In-memory reference ledger.
//!
//! Mirrors the semantics of the external audit-log contract: owner-gated
//! submitter allowlist, append-only records keyed by digest, idempotent
//! duplicate submission, monotonic sequence numbers.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use anchordesk_canonical::{Digest, SubmitterId, TxReference};
use sha2::{Digest as Sha2Digest, Sha256};

use crate::client::{LedgerClient, LedgerError};
use crate::record::{LedgerRecord, RecordAction, RecordReceipt};

struct Inner {
    records: BTreeMap<String, LedgerRecord>,
    receipts: BTreeMap<String, RecordReceipt>,
    allowlist: BTreeSet<String>,
    next_sequence: u64,
}

/// Reference ledger used by tests and the local development mode.
pub struct InMemoryLedger {
    owner: SubmitterId,
    inner: Mutex<Inner>,
}

impl InMemoryLedger {
    /// Creates a ledger owned by `owner`. The owner starts allowlisted.
    pub fn new(owner: SubmitterId) -> Self {
        let mut allowlist = BTreeSet::new();
        allowlist.insert(owner.as_ref().to_string());
        Self {
            owner,
            inner: Mutex::new(Inner {
                records: BTreeMap::new(),
                receipts: BTreeMap::new(),
                allowlist,
                next_sequence: 0,
            }),
        }
    }

    /// Adds an identity to the submitter allowlist. Owner only.
    pub fn grant(&self, actor: &SubmitterId, submitter: &SubmitterId) -> Result<(), LedgerError> {
        if actor != &self.owner {
            return Err(LedgerError::Unauthorized {
                submitter: actor.as_ref().to_string(),
            });
        }
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.allowlist.insert(submitter.as_ref().to_string());
        tracing::info!(submitter = %submitter, "submitter granted");
        Ok(())
    }

    /// Removes an identity from the submitter allowlist. Owner only.
    pub fn revoke(&self, actor: &SubmitterId, submitter: &SubmitterId) -> Result<(), LedgerError> {
        if actor != &self.owner {
            return Err(LedgerError::Unauthorized {
                submitter: actor.as_ref().to_string(),
            });
        }
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.allowlist.remove(submitter.as_ref());
        tracing::info!(submitter = %submitter, "submitter revoked");
        Ok(())
    }

    fn fabricate_tx_reference(digest: &Digest, sequence: u64) -> TxReference {
        let mut hasher = Sha256::new();
        hasher.update(b"anchordesk:tx:v1\0");
        hasher.update(digest.b64.as_bytes());
        hasher.update(sequence.to_le_bytes());
        let bytes: [u8; 32] = hasher.finalize().into();
        let mut hex = String::with_capacity(66);
        hex.push_str("0x");
        for b in bytes {
            hex.push_str(&format!("{:02x}", b));
        }
        TxReference::new(hex)
    }
}

impl LedgerClient for InMemoryLedger {
    fn submit(
        &self,
        digest: &Digest,
        action: RecordAction,
        entity_digest: &Digest,
        submitter: &SubmitterId,
        metadata: &str,
    ) -> Result<RecordReceipt, LedgerError> {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());

        // Authorization is checked before any mutation; a refused submit
        // leaves no trace, not even a partial write.
        if !inner.allowlist.contains(submitter.as_ref()) {
            return Err(LedgerError::Unauthorized {
                submitter: submitter.as_ref().to_string(),
            });
        }

        // Duplicate digest: idempotent no-op, original receipt returned.
        if let Some(receipt) = inner.receipts.get(&digest.b64) {
            return Ok(receipt.clone());
        }

        let sequence = inner.next_sequence;
        inner.next_sequence += 1;

        let record = LedgerRecord {
            digest: digest.clone(),
            action,
            entity_digest: entity_digest.clone(),
            submitter: submitter.clone(),
            sequence,
            metadata: metadata.to_string(),
        };
        let receipt = RecordReceipt {
            digest: digest.clone(),
            tx_reference: Self::fabricate_tx_reference(digest, sequence),
            sequence,
        };

        inner.records.insert(digest.b64.clone(), record);
        inner.receipts.insert(digest.b64.clone(), receipt.clone());
        Ok(receipt)
    }

    fn verify(&self, digest: &Digest) -> Result<Option<LedgerRecord>, LedgerError> {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        Ok(inner.records.get(&digest.b64).cloned())
    }

    fn total_records(&self) -> Result<u64, LedgerError> {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        Ok(inner.records.len() as u64)
    }

    fn is_authorized(&self, submitter: &SubmitterId) -> Result<bool, LedgerError> {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        Ok(inner.allowlist.contains(submitter.as_ref()))
    }
}
