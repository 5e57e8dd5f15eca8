//! The closure reconciliation coordinator.
//!
//! Owns the closure store and drives every ticket through the state
//! machine. The two entry paths differ only in who signs the ledger
//! submission; verification is shared and always recomputes digests from
//! the coordinator's own frozen payload.

use std::sync::{Arc, Mutex};
use std::thread;

use anchordesk_canonical::{
    compute_closure_digest, compute_entity_digest, Canonicalizer, ClosurePayload, Digest,
    SubmitterId, TicketId, Timestamp, TxReference,
};
use anchordesk_journal::{AnchorPath, AuditEvent, AuditOutcome, AuditRecord, TrailWriter};
use anchordesk_ledger::{
    LedgerClient, LedgerError, LedgerRecord, NetworkId, RecordAction, RetryPolicy,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::capability::Actor;
use crate::clock::{Clock, SystemClock};
use crate::closure::{ClosureReceipt, ClosureStatus, RejectionCause, TicketClosure};
use crate::errors::CoordinatorError;
use crate::store::ClosureStore;

/// Tuning knobs for the coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Retry schedule for direct-path submissions.
    pub submit_retry: RetryPolicy,
    /// Retry schedule for verify polling after an unknown outcome.
    pub verify_retry: RetryPolicy,
    /// Network every wallet confirmation must be bound to.
    pub required_network: NetworkId,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            submit_retry: RetryPolicy::default(),
            verify_retry: RetryPolicy::default(),
            required_network: NetworkId(80002),
        }
    }
}

/// Everything a signing client needs to anchor a closure itself.
///
/// The digest and entity digest are the coordinator's own; the client must
/// submit them unaltered, and [`Coordinator::confirm`] recomputes both
/// before believing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorRequest {
    /// Ticket being closed.
    pub ticket_id: TicketId,
    /// Digest the client must anchor.
    pub digest: Digest,
    /// Entity digest the record must carry.
    pub entity_digest: Digest,
    /// Action the record must carry.
    pub action: RecordAction,
    /// Network the signing session must be bound to.
    pub required_network: NetworkId,
}

/// Result of confirming a wallet-path anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The ledger holds the record; the ticket is closed.
    Closed(ClosureReceipt),
    /// The record is not visible yet; the closure stays pending and the
    /// sweeper will keep reconciling it.
    Pending,
}

/// Outcome of polling `verify` after an unknown submission result.
enum VerifyOutcome {
    Present(LedgerRecord),
    Absent,
    Undetermined,
}

/// Drives ticket closures to a terminal state.
pub struct Coordinator {
    pub(crate) ledger: Arc<dyn LedgerClient>,
    pub(crate) store: ClosureStore,
    pub(crate) clock: Arc<dyn Clock>,
    canonicalizer: Canonicalizer,
    identity: SubmitterId,
    config: CoordinatorConfig,
    audit: Mutex<Option<TrailWriter>>,
}

impl Coordinator {
    /// Creates a coordinator submitting under `identity`.
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        identity: SubmitterId,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            ledger,
            store: ClosureStore::new(),
            clock: Arc::new(SystemClock),
            canonicalizer: Canonicalizer::new(),
            identity,
            config,
            audit: Mutex::new(None),
        }
    }

    /// Replaces the clock; used by tests and the sweeper harness.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Attaches an audit trail; every terminal transition is appended.
    pub fn with_audit_trail(self, writer: TrailWriter) -> Self {
        *lock_poison_free(&self.audit) = Some(writer);
        self
    }

    /// Network wallet confirmations must be bound to.
    pub fn required_network(&self) -> NetworkId {
        self.config.required_network
    }

    /// The closure store backing this coordinator.
    pub fn store(&self) -> &ClosureStore {
        &self.store
    }

    /// Current status of a ticket's closure, if one exists.
    pub fn status(&self, ticket_id: &TicketId) -> Option<ClosureStatus> {
        self.store.get(ticket_id).map(|c| c.status)
    }

    /// Snapshot of a ticket's closure, if one exists.
    pub fn closure(&self, ticket_id: &TicketId) -> Option<TicketClosure> {
        self.store.get(ticket_id)
    }

    /// Resolves and anchors a ticket under the coordinator's own identity.
    ///
    /// Submission failures are retried per the configured schedule. An
    /// outcome the ledger cannot confirm is resolved by `verify` polling;
    /// if still undetermined the closure is parked as `AnchorPending` for
    /// the sweeper and [`CoordinatorError::AnchorOutcomeUnknown`] is
    /// returned.
    pub fn close_direct(
        &self,
        actor: &Actor,
        ticket_id: &str,
        resolution_text: &str,
    ) -> Result<ClosureReceipt, CoordinatorError> {
        let ticket_id = TicketId::parse(ticket_id)?;
        let lock = self.store.ticket_lock(&ticket_id);
        let _guard = lock_poison_free_arc(&lock);

        let mut closure = self.resolve(actor, &ticket_id, resolution_text, AnchorPath::Direct)?;
        closure.status = ClosureStatus::DirectSubmit;
        self.store.put(closure.clone());
        tracing::info!(
            ticket = %ticket_id,
            digest = %closure.digest,
            "direct closure submission started"
        );

        let metadata = submission_metadata(&closure);
        let mut attempt = 0u32;
        loop {
            let submitted = self.ledger.submit(
                &closure.digest,
                RecordAction::Close,
                &closure.entity_digest,
                &self.identity,
                &metadata,
            );
            match submitted {
                Ok(receipt) => match self.poll_verify(&closure.digest) {
                    VerifyOutcome::Present(record) => {
                        return self.close_from_record(
                            &mut closure,
                            record,
                            Some(receipt.tx_reference),
                        );
                    }
                    VerifyOutcome::Absent | VerifyOutcome::Undetermined => {
                        return self.park_pending(&mut closure);
                    }
                },
                Err(err @ LedgerError::Unavailable(_)) => {
                    tracing::warn!(ticket = %ticket_id, error = %err, attempt, "submit failed");
                    if self.config.submit_retry.should_retry(attempt) {
                        thread::sleep(self.config.submit_retry.delay_for(attempt));
                        attempt += 1;
                    } else {
                        self.reject(&mut closure, RejectionCause::SubmitFailed(err.to_string()))?;
                        return Err(CoordinatorError::Ledger(err));
                    }
                }
                Err(LedgerError::Unknown(reason)) => {
                    tracing::warn!(ticket = %ticket_id, %reason, "submission outcome unknown");
                    match self.poll_verify(&closure.digest) {
                        VerifyOutcome::Present(record) => {
                            return self.close_from_record(&mut closure, record, None);
                        }
                        VerifyOutcome::Absent => {
                            if self.config.submit_retry.should_retry(attempt) {
                                thread::sleep(self.config.submit_retry.delay_for(attempt));
                                attempt += 1;
                            } else {
                                let cause = RejectionCause::SubmitFailed(reason.clone());
                                self.reject(&mut closure, cause)?;
                                return Err(CoordinatorError::Ledger(LedgerError::Unknown(reason)));
                            }
                        }
                        VerifyOutcome::Undetermined => {
                            return self.park_pending(&mut closure);
                        }
                    }
                }
                Err(err @ LedgerError::Unauthorized { .. }) => {
                    self.reject(&mut closure, RejectionCause::Unauthorized)?;
                    return Err(CoordinatorError::Ledger(err));
                }
                Err(LedgerError::Rejected(reason)) => {
                    self.reject(&mut closure, RejectionCause::LedgerRejected(reason.clone()))?;
                    return Err(CoordinatorError::Ledger(LedgerError::Rejected(reason)));
                }
            }
        }
    }

    /// Resolves a ticket and hands back everything a signing client needs
    /// to anchor the closure itself.
    ///
    /// The closure is stored as `AnchorPending`; it settles through
    /// [`Coordinator::confirm`] or the sweeper.
    pub fn begin_wallet_close(
        &self,
        actor: &Actor,
        ticket_id: &str,
        resolution_text: &str,
    ) -> Result<AnchorRequest, CoordinatorError> {
        let ticket_id = TicketId::parse(ticket_id)?;
        let lock = self.store.ticket_lock(&ticket_id);
        let _guard = lock_poison_free_arc(&lock);

        let mut closure = self.resolve(actor, &ticket_id, resolution_text, AnchorPath::Wallet)?;
        closure.status = ClosureStatus::AnchorPending;
        closure.anchor_requested_at = Some(self.clock.now_utc());
        self.store.put(closure.clone());
        tracing::info!(
            ticket = %ticket_id,
            digest = %closure.digest,
            "wallet closure pending external anchor"
        );

        Ok(AnchorRequest {
            ticket_id,
            digest: closure.digest,
            entity_digest: closure.entity_digest,
            action: RecordAction::Close,
            required_network: self.config.required_network,
        })
    }

    /// Confirms an externally anchored closure.
    ///
    /// The claimed digest is never trusted: it is compared against the
    /// digest recomputed from the frozen payload, and the ledger is asked
    /// for the record before the ticket is closed. A mismatch rejects the
    /// closure permanently; an absent record leaves it pending.
    pub fn confirm(
        &self,
        ticket_id: &str,
        claimed_digest: &Digest,
        tx_reference: TxReference,
        network: NetworkId,
    ) -> Result<ConfirmOutcome, CoordinatorError> {
        let ticket_id = TicketId::parse(ticket_id)?;
        let lock = self.store.ticket_lock(&ticket_id);
        let _guard = lock_poison_free_arc(&lock);

        let Some(mut closure) = self.store.get(&ticket_id) else {
            return Err(CoordinatorError::UnknownTicket { ticket_id });
        };
        match closure.status {
            ClosureStatus::AnchorPending => {}
            ClosureStatus::Closed => {
                return Err(CoordinatorError::AlreadyClosed { ticket_id });
            }
            ClosureStatus::Rejected => {
                let cause = closure
                    .rejection
                    .as_ref()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "unrecorded".to_string());
                return Err(CoordinatorError::ClosureRejected { ticket_id, cause });
            }
            ClosureStatus::Resolving | ClosureStatus::DirectSubmit | ClosureStatus::Anchored => {
                return Err(CoordinatorError::ClosureInFlight { ticket_id });
            }
        }

        if network != self.config.required_network {
            // Wrong-network confirmations are refused but do not poison
            // the closure; the client may rebind and confirm again.
            return Err(CoordinatorError::NetworkMismatch {
                expected: self.config.required_network,
                actual: network,
            });
        }

        let recomputed = compute_closure_digest(&closure.payload, &self.canonicalizer)?;
        if *claimed_digest != recomputed {
            tracing::warn!(
                ticket = %ticket_id,
                recomputed = %recomputed,
                claimed = %claimed_digest,
                "claimed digest does not match frozen payload"
            );
            self.reject(&mut closure, RejectionCause::DigestMismatch)?;
            return Err(CoordinatorError::DigestMismatch {
                expected: recomputed,
                claimed: claimed_digest.clone(),
            });
        }

        match self.ledger.verify(&recomputed)? {
            Some(record) => {
                let receipt = self.close_from_record(&mut closure, record, Some(tx_reference))?;
                Ok(ConfirmOutcome::Closed(receipt))
            }
            None => {
                tracing::debug!(ticket = %ticket_id, "anchor not yet visible; staying pending");
                Ok(ConfirmOutcome::Pending)
            }
        }
    }

    /// Capability check, supersession check, payload freeze.
    fn resolve(
        &self,
        actor: &Actor,
        ticket_id: &TicketId,
        resolution_text: &str,
        path: AnchorPath,
    ) -> Result<TicketClosure, CoordinatorError> {
        if !actor.role.can_close_tickets() {
            tracing::warn!(actor = %actor.id, role = %actor.role, "closure denied");
            return Err(CoordinatorError::CapabilityDenied { role: actor.role });
        }

        if let Some(existing) = self.store.get(ticket_id) {
            match existing.status {
                ClosureStatus::Closed => {
                    return Err(CoordinatorError::AlreadyClosed {
                        ticket_id: ticket_id.clone(),
                    });
                }
                ClosureStatus::Rejected => {
                    tracing::info!(ticket = %ticket_id, "superseding rejected closure");
                }
                _ => {
                    return Err(CoordinatorError::ClosureInFlight {
                        ticket_id: ticket_id.clone(),
                    });
                }
            }
        }

        let payload = ClosurePayload::new(
            ticket_id.as_ref(),
            resolution_text,
            self.timestamp_now().as_ref(),
        )?;
        let digest = compute_closure_digest(&payload, &self.canonicalizer)?;
        let entity_digest = compute_entity_digest(ticket_id);
        Ok(TicketClosure {
            ticket_id: ticket_id.clone(),
            payload,
            digest,
            entity_digest,
            path,
            status: ClosureStatus::Resolving,
            tx_reference: None,
            anchor_requested_at: None,
            rejection: None,
        })
    }

    /// Recomputes a closure's digest from its frozen payload. Used by the
    /// sweeper so that a tampered stored digest is caught before `verify`.
    pub(crate) fn recompute_digest(
        &self,
        closure: &TicketClosure,
    ) -> Result<Digest, CoordinatorError> {
        Ok(compute_closure_digest(&closure.payload, &self.canonicalizer)?)
    }

    /// Polls `verify` until the digest resolves to present or absent, or
    /// the schedule is exhausted with only transport errors.
    fn poll_verify(&self, digest: &Digest) -> VerifyOutcome {
        let policy = &self.config.verify_retry;
        let mut attempt = 0u32;
        let mut last = VerifyOutcome::Undetermined;
        loop {
            match self.ledger.verify(digest) {
                Ok(Some(record)) => return VerifyOutcome::Present(record),
                Ok(None) => last = VerifyOutcome::Absent,
                Err(err) => {
                    tracing::debug!(error = %err, attempt, "verify poll failed");
                    last = VerifyOutcome::Undetermined;
                }
            }
            if policy.should_retry(attempt) {
                thread::sleep(policy.delay_for(attempt));
                attempt += 1;
            } else {
                return last;
            }
        }
    }

    /// Closes a ticket against a verified ledger record.
    ///
    /// Rejects instead when the record's entity digest does not match the
    /// one recomputed from the ticket id.
    pub(crate) fn close_from_record(
        &self,
        closure: &mut TicketClosure,
        record: LedgerRecord,
        tx_reference: Option<TxReference>,
    ) -> Result<ClosureReceipt, CoordinatorError> {
        if record.entity_digest != closure.entity_digest {
            tracing::warn!(
                ticket = %closure.ticket_id,
                "verified record carries a foreign entity digest"
            );
            self.reject(closure, RejectionCause::DigestMismatch)?;
            return Err(CoordinatorError::DigestMismatch {
                expected: closure.entity_digest.clone(),
                claimed: record.entity_digest,
            });
        }

        closure.status = ClosureStatus::Anchored;
        closure.tx_reference = tx_reference.clone();
        closure.rejection = None;
        self.store.put(closure.clone());

        closure.status = ClosureStatus::Closed;
        self.store.put(closure.clone());
        self.append_audit(closure, AuditOutcome::Closed, None)?;
        tracing::info!(
            ticket = %closure.ticket_id,
            digest = %closure.digest,
            sequence = record.sequence,
            "ticket closed"
        );
        Ok(ClosureReceipt {
            ticket_id: closure.ticket_id.clone(),
            digest: closure.digest.clone(),
            entity_digest: closure.entity_digest.clone(),
            tx_reference,
            path: closure.path,
        })
    }

    /// Marks a closure rejected and audits the transition.
    pub(crate) fn reject(
        &self,
        closure: &mut TicketClosure,
        cause: RejectionCause,
    ) -> Result<(), CoordinatorError> {
        tracing::warn!(ticket = %closure.ticket_id, %cause, "closure rejected");
        closure.status = ClosureStatus::Rejected;
        closure.rejection = Some(cause.clone());
        self.store.put(closure.clone());
        self.append_audit(closure, AuditOutcome::Rejected, Some(cause.to_string()))
    }

    /// Parks a closure as `AnchorPending` for the sweeper and reports the
    /// unknown outcome to the caller.
    fn park_pending(&self, closure: &mut TicketClosure) -> Result<ClosureReceipt, CoordinatorError> {
        closure.status = ClosureStatus::AnchorPending;
        closure.anchor_requested_at = Some(self.clock.now_utc());
        self.store.put(closure.clone());
        tracing::warn!(
            ticket = %closure.ticket_id,
            "anchor outcome unknown; parked for reconciliation"
        );
        Err(CoordinatorError::AnchorOutcomeUnknown {
            ticket_id: closure.ticket_id.clone(),
        })
    }

    fn append_audit(
        &self,
        closure: &TicketClosure,
        outcome: AuditOutcome,
        cause: Option<String>,
    ) -> Result<(), CoordinatorError> {
        let mut guard = lock_poison_free(&self.audit);
        let Some(writer) = guard.as_mut() else {
            return Ok(());
        };
        let record = AuditRecord {
            ticket_id: closure.ticket_id.clone(),
            digest: closure.digest.clone(),
            entity_digest: closure.entity_digest.clone(),
            path: closure.path,
            outcome,
            cause,
            tx_reference: closure.tx_reference.clone(),
            submitter: self.identity.clone(),
            occurred_at: self.timestamp_now(),
        };
        let event = AuditEvent::seal(record, &self.canonicalizer)?;
        writer.append_event(&event)?;
        Ok(())
    }

    fn timestamp_now(&self) -> Timestamp {
        Timestamp::new(
            self.clock
                .now_utc()
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        )
    }
}

fn submission_metadata(closure: &TicketClosure) -> String {
    serde_json::json!({
        "ticket_id": closure.ticket_id,
        "path": closure.path,
    })
    .to_string()
}

fn lock_poison_free<'a, T>(mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn lock_poison_free_arc(mutex: &Arc<Mutex<()>>) -> std::sync::MutexGuard<'_, ()> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
