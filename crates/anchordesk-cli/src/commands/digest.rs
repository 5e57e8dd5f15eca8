//! Digest command implementation.
//!
//! Computes the exact digest the coordinator would anchor for a given
//! ticket resolution, so an operator can cross-check a ledger record by
//! hand.

use anchordesk_canonical::{
    compute_closure_digest, compute_entity_digest, Canonicalizer, ClosurePayload,
};
use serde_json::json;

pub fn run(
    ticket: String,
    resolution: String,
    closed_at: String,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let canonicalizer = Canonicalizer::new();
    let payload = ClosurePayload::new(ticket, resolution, closed_at)
        .map_err(|e| format!("Invalid payload: {}", e))?;
    let digest = compute_closure_digest(&payload, &canonicalizer)
        .map_err(|e| format!("Digest computation failed: {}", e))?;
    let entity_digest = compute_entity_digest(&payload.ticket_id);
    let digest_hex = digest
        .to_hex()
        .map_err(|e| format!("Malformed digest: {}", e))?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "ticket_id": payload.ticket_id,
                "digest": digest,
                "digest_hex": digest_hex,
                "entity_digest": entity_digest,
            }))?
        );
    } else {
        println!("ticket:        {}", payload.ticket_id);
        println!("digest:        {}", digest.b64);
        println!("digest_hex:    {}", digest_hex);
        println!("entity_digest: {}", entity_digest.b64);
    }
    Ok(())
}
