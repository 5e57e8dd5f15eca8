//! Output formatting utilities.

use anchordesk_journal::{AuditEvent, AuditOutcome};

/// Formats an event as a simple table row.
pub fn format_table_row(event: &AuditEvent) -> String {
    let outcome = match event.record.outcome {
        AuditOutcome::Closed => "closed",
        AuditOutcome::Rejected => "rejected",
    };
    let path = match event.record.path {
        anchordesk_journal::AnchorPath::Direct => "direct",
        anchordesk_journal::AnchorPath::Wallet => "wallet",
    };
    format!(
        "{:<44} {:<16} {:<9} {:<7} {}",
        truncate(&event.event_id.b64, 44),
        truncate(event.record.ticket_id.as_ref(), 16),
        outcome,
        path,
        event.record.occurred_at
    )
}

/// Prints table header.
pub fn print_table_header() {
    println!(
        "{:<44} {:<16} {:<9} {:<7} {}",
        "EVENT_ID", "TICKET", "OUTCOME", "PATH", "OCCURRED_AT"
    );
    println!("{}", "-".repeat(100));
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}
