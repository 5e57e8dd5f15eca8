//! Closure reconciliation coordinator for Anchordesk.
//!
//! Accepts ticket closure requests from two paths — a trusted backend
//! path submitting under the coordinator's own authorized identity, and a
//! user-wallet-signed path confirmed after the fact — and drives each
//! ticket to a terminal state. Both paths converge on a single
//! verify-then-close routine: the coordinator always recomputes the digest
//! from its own stored payload and checks the ledger before marking a
//! ticket closed. A background sweeper reconciles closures left pending by
//! partial failures.
//!
//! Core invariants:
//! - A ticket reaches `Closed` only when a ledger record with the
//!   independently recomputed digest and matching entity digest exists.
//! - At most one non-superseded closure is in flight per ticket.
//! - Digest mismatches fail closed: `Rejected`, flagged, never auto-retried.
//! - Every terminal transition is appended to the audit trail.

#![deny(missing_docs)]

/// Role-based capability checks.
pub mod capability;
/// Clock abstraction for testable time.
pub mod clock;
/// Ticket closure record and state machine types.
pub mod closure;
/// The reconciliation coordinator.
pub mod coordinator;
/// Error types for coordinator operations.
pub mod errors;
/// In-memory closure store with per-ticket locking.
pub mod store;
/// Background reconciliation sweeper.
pub mod sweeper;

pub use capability::{Actor, Role};
pub use clock::{Clock, ManualClock, SystemClock};
pub use closure::{ClosureReceipt, ClosureStatus, RejectionCause, TicketClosure};
pub use coordinator::{AnchorRequest, ConfirmOutcome, Coordinator, CoordinatorConfig};
pub use errors::CoordinatorError;
pub use store::ClosureStore;
pub use sweeper::{SweepConfig, SweepReport, Sweeper};
