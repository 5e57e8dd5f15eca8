//! Client abstraction over the external append-only ledger.
//!
//! This crate provides:
//! - `LedgerClient` trait for submit/verify/allowlist operations
//! - `InMemoryLedger`: reference implementation with owner-gated allowlist
//! - Retry policy with exponential backoff for transient transport faults
//! - Wallet session management for network binding before signed submission
//! - A test kit with fault injection for reconciliation testing
//!
//! The ledger itself is treated as an opaque, already-correct append-only
//! store. A submission whose outcome the transport cannot confirm surfaces
//! as [`LedgerError::Unknown`]; callers must follow up with `verify` before
//! concluding failure — the client never fabricates a success result.

#![deny(missing_docs)]

/// Ledger client trait and error taxonomy.
pub mod client;
/// In-memory reference ledger.
pub mod memory;
/// Ledger record and receipt types.
pub mod record;
/// Bounded retry with exponential backoff.
pub mod retry;
/// Wallet session and network binding.
pub mod session;
/// Fault-injecting test doubles.
pub mod testkit;

pub use client::{LedgerClient, LedgerError};
pub use memory::InMemoryLedger;
pub use record::{LedgerRecord, RecordAction, RecordReceipt};
pub use retry::RetryPolicy;
pub use session::{ensure_network, NetworkId, NetworkProfile, SessionError, WalletSession};
