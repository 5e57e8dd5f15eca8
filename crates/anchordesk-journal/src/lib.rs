//! Framed append-only audit trail for closure transitions.
//!
//! Every terminal transition of a ticket closure (`closed` or `rejected`)
//! is appended here with its digest, path, and timestamp. The trail is
//! append-only from the application's point of view and tamper-evident at
//! two layers: each frame head seals its own bytes, and each event carries
//! a content-derived event id that can be recomputed offline.
//!
//! ## Quick Start
//!
//! ```rust
//! use anchordesk_canonical::{Canonicalizer, Digest, SubmitterId, TicketId, Timestamp};
//! use anchordesk_journal::{
//!     AnchorPath, AuditEvent, AuditOutcome, AuditRecord, ReadMode, TrailReader, TrailWriter,
//!     WriteOptions,
//! };
//!
//! let canonicalizer = Canonicalizer::new();
//! let record = AuditRecord {
//!     ticket_id: TicketId::parse("T1")?,
//!     digest: Digest::from_bytes([1u8; 32]),
//!     entity_digest: Digest::from_bytes([2u8; 32]),
//!     path: AnchorPath::Direct,
//!     outcome: AuditOutcome::Closed,
//!     cause: None,
//!     tx_reference: None,
//!     submitter: SubmitterId::parse("service:anchordesk")?,
//!     occurred_at: Timestamp::parse("2024-01-01T10:00:00Z")?,
//! };
//! let event = AuditEvent::seal(record, &canonicalizer)?;
//!
//! let mut writer = TrailWriter::open("closures.adt", WriteOptions::default())?;
//! writer.append_event(&event)?;
//! writer.finish()?;
//!
//! let mut reader = TrailReader::open("closures.adt", ReadMode::Strict)?;
//! while let Some(event) = reader.read_event()? {
//!     println!("audit event: {}", event.event_id);
//! }
//! # std::fs::remove_file("closures.adt").ok();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]

/// Error types for trail operations.
pub mod errors;
/// Typed audit event and event-id computation.
pub mod event;
/// On-disk layout: preamble and sealed frames.
pub mod frame;
/// Trail reader implementation.
pub mod reader;
/// Verification helpers for trail events.
pub mod verification;
/// Trail writer implementation.
pub mod writer;

pub use errors::TrailError;
pub use event::{AnchorPath, AuditEvent, AuditOutcome, AuditRecord, AUDIT_DOMAIN_SEPARATOR};
pub use frame::{FrameHead, FrameKind, FrameSeal};
pub use reader::{ReadMode, TrailReader};
pub use verification::verify_event_id;
pub use writer::{TrailWriter, WriteOptions};
