//! List command implementation.

use crate::output;
use crate::path;
use anchordesk_journal::{ReadMode, TrailReader};

pub fn run(
    trail: String,
    json: bool,
    max_events: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let trail_path = path::validate_trail_path(&trail)?;

    let mut reader = TrailReader::open(&trail_path, ReadMode::Permissive).map_err(|e| {
        let sanitized = path::sanitize_path_for_error(&trail_path);
        format!("Failed to open trail file {}: {}", sanitized, e)
    })?;

    if !json {
        output::print_table_header();
    }

    let mut event_count: u64 = 0;
    while let Some(event) = reader.read_event()? {
        if let Some(max) = max_events {
            if event_count >= max {
                break;
            }
        }

        if json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            println!("{}", output::format_table_row(&event));
        }
        event_count += 1;
    }

    Ok(())
}
