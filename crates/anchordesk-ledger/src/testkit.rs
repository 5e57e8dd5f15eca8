//! Fault-injecting test doubles for reconciliation testing.
//!
//! These live in the library (not behind `#[cfg(test)]`) so that dependent
//! crates can drive their own partial-failure scenarios.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Mutex;

use anchordesk_canonical::{Digest, SubmitterId};

use crate::client::{LedgerClient, LedgerError};
use crate::memory::InMemoryLedger;
use crate::record::{LedgerRecord, RecordAction, RecordReceipt};
use crate::session::{NetworkId, NetworkProfile, SessionError, WalletSession};

/// A fault applied to the next `submit` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitFault {
    /// Transport reports the ledger unreachable; nothing lands.
    Unavailable,
    /// Transport times out but the record actually landed.
    UnknownButLanded,
    /// Transport times out and the record did not land.
    UnknownAndDropped,
}

/// Wraps an [`InMemoryLedger`] and injects scripted faults on `submit`.
///
/// Faults are consumed in order; once the script is exhausted, calls pass
/// straight through.
pub struct ScriptedLedger {
    inner: InMemoryLedger,
    faults: Mutex<VecDeque<SubmitFault>>,
}

impl ScriptedLedger {
    /// Wraps the given ledger with an empty fault script.
    pub fn new(inner: InMemoryLedger) -> Self {
        Self {
            inner,
            faults: Mutex::new(VecDeque::new()),
        }
    }

    /// Appends a fault to the script.
    pub fn push_fault(&self, fault: SubmitFault) {
        self.faults
            .lock()
            .expect("fault script lock poisoned")
            .push_back(fault);
    }

    /// Access to the wrapped ledger (e.g. for allowlist management).
    pub fn inner(&self) -> &InMemoryLedger {
        &self.inner
    }
}

impl LedgerClient for ScriptedLedger {
    fn submit(
        &self,
        digest: &Digest,
        action: RecordAction,
        entity_digest: &Digest,
        submitter: &SubmitterId,
        metadata: &str,
    ) -> Result<RecordReceipt, LedgerError> {
        let fault = self
            .faults
            .lock()
            .expect("fault script lock poisoned")
            .pop_front();
        match fault {
            None => self
                .inner
                .submit(digest, action, entity_digest, submitter, metadata),
            Some(SubmitFault::Unavailable) => {
                Err(LedgerError::Unavailable("scripted outage".to_string()))
            }
            Some(SubmitFault::UnknownButLanded) => {
                self.inner
                    .submit(digest, action, entity_digest, submitter, metadata)?;
                Err(LedgerError::Unknown("scripted timeout".to_string()))
            }
            Some(SubmitFault::UnknownAndDropped) => {
                Err(LedgerError::Unknown("scripted timeout".to_string()))
            }
        }
    }

    fn verify(&self, digest: &Digest) -> Result<Option<LedgerRecord>, LedgerError> {
        self.inner.verify(digest)
    }

    fn total_records(&self) -> Result<u64, LedgerError> {
        self.inner.total_records()
    }

    fn is_authorized(&self, submitter: &SubmitterId) -> Result<bool, LedgerError> {
        self.inner.is_authorized(submitter)
    }
}

/// Scriptable signing agent for session binding tests.
pub struct MockWalletSession {
    active: Mutex<NetworkId>,
    known: Mutex<BTreeSet<u64>>,
    decline_switch: bool,
    decline_register: bool,
}

impl MockWalletSession {
    /// Agent bound to `active` and aware of the given networks.
    pub fn new(active: NetworkId, known: impl IntoIterator<Item = NetworkId>) -> Self {
        Self {
            active: Mutex::new(active),
            known: Mutex::new(known.into_iter().map(|n| n.0).collect()),
            decline_switch: false,
            decline_register: false,
        }
    }

    /// Makes the user decline switch requests.
    pub fn declining_switch(mut self) -> Self {
        self.decline_switch = true;
        self
    }

    /// Makes the user decline registration requests.
    pub fn declining_register(mut self) -> Self {
        self.decline_register = true;
        self
    }
}

impl WalletSession for MockWalletSession {
    fn active_network(&self) -> Result<NetworkId, SessionError> {
        Ok(*self.active.lock().expect("session lock poisoned"))
    }

    fn switch_network(&self, network: NetworkId) -> Result<(), SessionError> {
        if self.decline_switch {
            return Err(SessionError::Declined("switch refused".to_string()));
        }
        if !self
            .known
            .lock()
            .expect("session lock poisoned")
            .contains(&network.0)
        {
            return Err(SessionError::UnknownNetwork(network));
        }
        *self.active.lock().expect("session lock poisoned") = network;
        Ok(())
    }

    fn register_network(&self, profile: &NetworkProfile) -> Result<(), SessionError> {
        if self.decline_register {
            return Err(SessionError::Declined("registration refused".to_string()));
        }
        self.known
            .lock()
            .expect("session lock poisoned")
            .insert(profile.chain_id.0);
        Ok(())
    }
}
