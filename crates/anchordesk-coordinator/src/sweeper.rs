//! Background reconciliation of pending anchors.
//!
//! Wallet-path closures (and direct closures whose outcome could not be
//! determined) sit in `AnchorPending` until something settles them. The
//! sweeper periodically verifies each pending digest against the ledger:
//! present records close the ticket, and closures older than the allowed
//! window are rejected with an anchor timeout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::Duration as StdDuration;

use chrono::Duration;

use crate::closure::{ClosureStatus, RejectionCause};
use crate::coordinator::Coordinator;

/// Sweep timing parameters.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Minimum age before a pending closure is examined at all; gives
    /// in-flight confirmations time to land without ledger traffic.
    pub grace: Duration,
    /// Age past which a still-absent anchor is rejected as timed out.
    pub max_pending_age: Duration,
    /// Pause between sweep passes.
    pub interval: StdDuration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            grace: Duration::seconds(60),
            max_pending_age: Duration::hours(1),
            interval: StdDuration::from_secs(30),
        }
    }
}

/// Counts from one sweep pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Pending closures old enough to be verified against the ledger.
    pub examined: usize,
    /// Closures settled as closed.
    pub closed: usize,
    /// Closures rejected (timeout or foreign record).
    pub rejected: usize,
    /// Closures left pending for a later pass.
    pub still_pending: usize,
    /// Tickets skipped because another operation held their lock.
    pub skipped: usize,
}

/// Periodically reconciles `AnchorPending` closures.
pub struct Sweeper {
    coordinator: Arc<Coordinator>,
    config: SweepConfig,
}

impl Sweeper {
    /// Creates a sweeper over the given coordinator.
    pub fn new(coordinator: Arc<Coordinator>, config: SweepConfig) -> Self {
        Self {
            coordinator,
            config,
        }
    }

    /// Runs a single sweep pass.
    ///
    /// Contended tickets are skipped rather than waited on; a pass never
    /// blocks behind a live closure operation.
    pub fn sweep_once(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let now = self.coordinator.clock.now_utc();

        for ticket_id in self.coordinator.store.anchor_pending_tickets() {
            let lock = self.coordinator.store.ticket_lock(&ticket_id);
            let _guard = match lock.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => {
                    report.skipped += 1;
                    continue;
                }
            };

            // Re-read under the lock; the closure may have settled since
            // the listing was taken.
            let Some(mut closure) = self.coordinator.store.get(&ticket_id) else {
                continue;
            };
            if closure.status != ClosureStatus::AnchorPending {
                continue;
            }
            let Some(requested_at) = closure.anchor_requested_at else {
                continue;
            };

            let age = now - requested_at;
            if age < self.config.grace {
                report.still_pending += 1;
                continue;
            }
            report.examined += 1;

            // Never trust the stored digest; recompute from the payload.
            let digest = match self.coordinator.recompute_digest(&closure) {
                Ok(digest) => digest,
                Err(err) => {
                    tracing::error!(ticket = %ticket_id, error = %err, "digest recompute failed");
                    continue;
                }
            };
            if digest != closure.digest {
                tracing::warn!(ticket = %ticket_id, "stored digest does not match payload");
                match self
                    .coordinator
                    .reject(&mut closure, RejectionCause::DigestMismatch)
                {
                    Ok(()) => report.rejected += 1,
                    Err(err) => {
                        tracing::error!(ticket = %ticket_id, error = %err, "failed to reject");
                    }
                }
                continue;
            }

            match self.coordinator.ledger.verify(&digest) {
                Ok(Some(record)) => {
                    match self.coordinator.close_from_record(&mut closure, record, None) {
                        Ok(_) => report.closed += 1,
                        Err(err) => {
                            tracing::warn!(ticket = %ticket_id, error = %err, "sweep close failed");
                            report.rejected += 1;
                        }
                    }
                }
                Ok(None) => {
                    if age >= self.config.max_pending_age {
                        match self
                            .coordinator
                            .reject(&mut closure, RejectionCause::AnchorTimeout)
                        {
                            Ok(()) => report.rejected += 1,
                            Err(err) => {
                                tracing::error!(
                                    ticket = %ticket_id,
                                    error = %err,
                                    "failed to record anchor timeout"
                                );
                            }
                        }
                    } else {
                        report.still_pending += 1;
                    }
                }
                Err(err) => {
                    tracing::warn!(ticket = %ticket_id, error = %err, "sweep verify failed");
                    report.still_pending += 1;
                }
            }
        }

        tracing::debug!(
            examined = report.examined,
            closed = report.closed,
            rejected = report.rejected,
            still_pending = report.still_pending,
            skipped = report.skipped,
            "sweep pass complete"
        );
        report
    }

    /// Sweeps until `shutdown` is set.
    pub fn run(&self, shutdown: &AtomicBool) {
        while !shutdown.load(Ordering::Relaxed) {
            self.sweep_once();
            let mut slept = StdDuration::ZERO;
            while slept < self.config.interval && !shutdown.load(Ordering::Relaxed) {
                let step = StdDuration::from_millis(50).min(self.config.interval - slept);
                thread::sleep(step);
                slept += step;
            }
        }
    }

    /// Spawns the sweep loop on a background thread.
    pub fn spawn(self, shutdown: Arc<AtomicBool>) -> JoinHandle<()> {
        thread::spawn(move || self.run(&shutdown))
    }
}
