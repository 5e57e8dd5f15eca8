//! Verify command implementation.

use crate::output;
use crate::path;
use anchordesk_canonical::Canonicalizer;
use anchordesk_journal::{verify_event_id, ReadMode, TrailReader};
use serde_json::json;

pub fn run(
    trail: String,
    strict: bool,
    json_output: bool,
    max_events: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let trail_path = path::validate_trail_path(&trail)?;
    let mut reader = TrailReader::open(&trail_path, ReadMode::Strict).map_err(|e| {
        let sanitized = path::sanitize_path_for_error(&trail_path);
        format!("Failed to open trail file {}: {}", sanitized, e)
    })?;

    let canonicalizer = Canonicalizer::new();
    let mut all_ok = true;
    let mut results = Vec::new();
    let mut event_count: u64 = 0;

    while let Some(event) = reader.read_event()? {
        if let Some(max) = max_events {
            if event_count >= max {
                break;
            }
        }
        event_count += 1;

        let ok = verify_event_id(&event, &canonicalizer)
            .map_err(|e| format!("Failed to verify event: {}", e))?;
        all_ok = all_ok && ok;
        results.push((
            event.event_id.b64.clone(),
            event.record.ticket_id.as_ref().to_string(),
            ok,
        ));
    }

    if json_output {
        let json_results: Vec<_> = results
            .into_iter()
            .map(|(id, ticket, ok)| {
                json!({
                    "event_id": id,
                    "ticket_id": ticket,
                    "verdict": if ok { "ok" } else { "tampered" },
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json_results)?);
    } else {
        println!("{:<44} {:<16} {}", "EVENT_ID", "TICKET", "VERDICT");
        println!("{}", "-".repeat(70));
        for (id, ticket, ok) in results {
            println!(
                "{:<44} {:<16} {}",
                output::truncate(&id, 44),
                output::truncate(&ticket, 16),
                if ok { "ok" } else { "tampered" }
            );
        }
    }

    if strict && !all_ok {
        std::process::exit(1);
    }

    Ok(())
}
