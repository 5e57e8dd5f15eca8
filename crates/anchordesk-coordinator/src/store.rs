//! In-memory closure store.
//!
//! Holds the authoritative copy of every closure the coordinator knows
//! about, plus a per-ticket lock table. All ledger-facing work on a ticket
//! happens under that ticket's lock; the store's own mutexes are only ever
//! held for map access, never across I/O.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anchordesk_canonical::TicketId;

use crate::closure::{ClosureStatus, TicketClosure};

/// Thread-safe store of closures keyed by ticket id.
#[derive(Debug, Default)]
pub struct ClosureStore {
    closures: Mutex<HashMap<String, TicketClosure>>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ClosureStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the serialization lock for a ticket, creating it on first
    /// use. Locks are never removed; the table grows with distinct tickets.
    pub fn ticket_lock(&self, ticket_id: &TicketId) -> Arc<Mutex<()>> {
        let mut locks = lock_poison_free(&self.locks);
        locks
            .entry(ticket_id.as_ref().to_string())
            .or_default()
            .clone()
    }

    /// Snapshot of the closure for a ticket, if any.
    pub fn get(&self, ticket_id: &TicketId) -> Option<TicketClosure> {
        lock_poison_free(&self.closures)
            .get(ticket_id.as_ref())
            .cloned()
    }

    /// Inserts or replaces the closure for its ticket.
    pub fn put(&self, closure: TicketClosure) {
        lock_poison_free(&self.closures)
            .insert(closure.ticket_id.as_ref().to_string(), closure);
    }

    /// Tickets whose closure is currently [`ClosureStatus::AnchorPending`].
    pub fn anchor_pending_tickets(&self) -> Vec<TicketId> {
        lock_poison_free(&self.closures)
            .values()
            .filter(|c| c.status == ClosureStatus::AnchorPending)
            .map(|c| c.ticket_id.clone())
            .collect()
    }

    /// Number of closures tracked, any state.
    pub fn len(&self) -> usize {
        lock_poison_free(&self.closures).len()
    }

    /// Whether the store tracks no closures.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_poison_free<'a, T>(mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
